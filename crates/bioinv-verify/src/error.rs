use thiserror::Error;

/// Errors raised while attempting a single URL liveness check.
///
/// These never escape the verification stage: after retries are exhausted
/// the terminal error is folded into a
/// [`bioinv_core::CheckOutcome::NetworkError`] recorded on the row.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The URL did not parse; checked before any request is sent.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network-level failure from the underlying HTTP client: DNS failure,
    /// connection refused, timeout, TLS error.
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
