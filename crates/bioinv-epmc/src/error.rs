use thiserror::Error;

/// Errors returned by the EuropePMC search client.
#[derive(Debug, Error)]
pub enum EpmcError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cursor pagination exceeded the page cap; guards against cursor cycles.
    #[error("pagination limit reached for query \"{query}\": exceeded {max_pages} pages")]
    PageLimit { query: String, max_pages: usize },
}
