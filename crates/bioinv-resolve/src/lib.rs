//! Post-verification resolution stages: name selection, structural
//! filtering, deduplication, and review flagging.
//!
//! All passes here are pure, single-threaded, order-preserving transforms
//! over the in-memory record set — they are CPU-cheap next to the network
//! stage and need no concurrency.

pub mod dedup;
pub mod filter;
pub mod names;
pub mod pipeline;
pub mod review;

pub use dedup::deduplicate;
pub use filter::{filter_records, RemovalReport};
pub use names::resolve_names;
pub use pipeline::{resolve_inventory, ResolutionOutput};
pub use review::{flag_for_review, ReviewSummary};
