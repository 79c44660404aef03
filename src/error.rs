use thiserror::Error;

/// Errors produced by the fetch gateway and the typed API clients.
///
/// Extraction strategies never surface these directly: a failed strategy
/// yields an empty result and the pipeline moves on. Only route handlers
/// translate a remaining error into an HTTP status.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}
