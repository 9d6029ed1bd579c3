//! URL verification for extracted resource links.
//!
//! Each URL goes through a liveness check with bounded retries and
//! exponential backoff, then best-effort geolocation of the responding host
//! (successful checks only) and a Wayback Machine snapshot lookup
//! (regardless of live status). [`UrlVerifier`] drives the whole set of
//! URLs across all records through a bounded-concurrency pool.

pub mod archive;
pub mod client;
pub mod error;
pub mod geo;
mod retry;
pub mod verifier;

pub use archive::ArchiveClient;
pub use client::UrlChecker;
pub use error::CheckError;
pub use geo::{default_providers, GeoProvider, GeoResolver};
pub use verifier::UrlVerifier;
