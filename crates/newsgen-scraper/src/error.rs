use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The primary HTTP client could not be built (e.g. TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The server could not be reached or the response could not be read.
    /// A reachable server that serves an anti-bot page is not an error.
    #[error("could not reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
