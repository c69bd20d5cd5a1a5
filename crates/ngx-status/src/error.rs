//! Error types for scraping and configuring the status client.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for a single scrape.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Errors that can occur while fetching or parsing the status page.
///
/// None of these are fatal: the collector turns every one of them into
/// `up = 0` for the current pass.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("status request failed: {0}")]
    Network(String),

    #[error("status request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid status response: {raw:?}")]
    Format { raw: String },
}

impl ScrapeError {
    /// Whether the failure happened on the transport rather than in the body.
    pub fn is_network(&self) -> bool {
        matches!(self, ScrapeError::Network(_) | ScrapeError::Timeout(_))
    }
}

/// Errors raised while building the client or collector at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid status endpoint {url:?}: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid identity header value {0:?}")]
    UserAgent(String),

    #[error("invalid metric namespace {0:?}")]
    Namespace(String),
}
