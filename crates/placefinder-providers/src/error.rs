use thiserror::Error;

/// Errors returned by the upstream service clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The upstream answered but reported a failure in its payload.
    #[error("upstream API error: {0}")]
    Api(String),

    /// The completion response contained no text.
    #[error("completion response contained no text")]
    EmptyCompletion,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
