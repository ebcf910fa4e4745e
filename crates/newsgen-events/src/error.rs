use thiserror::Error;

/// Errors returned while talking to the events API.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network or TLS failure from the underlying HTTP client, after retries.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not JSON. Checked before the status code.
    #[error("response from {url} (HTTP {status}) is not JSON: {source}; body: {excerpt}")]
    Parse {
        status: u16,
        url: String,
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but the status was not 2xx.
    #[error("HTTP {status} from {url}: {excerpt}")]
    Http {
        status: u16,
        url: String,
        excerpt: String,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
