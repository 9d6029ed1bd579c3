//! HTTP client for the EuropePMC REST search API.
//!
//! Wraps `reqwest` with typed response deserialization and cursor-mark
//! pagination. Used by the `query` stage to pull candidate articles
//! (id, title, abstract) for downstream classification.

pub mod client;
pub mod error;
pub mod types;

pub use client::{substitute_date_range, EpmcClient};
pub use error::EpmcError;
pub use types::{Article, SearchPage};
