//! Error types for scrape runs.
//!
//! Field probes and single-record failures never surface here; they are
//! absorbed where they happen. `ScrapeError` is for failures that end a run.

use thiserror::Error;

use crate::session::SessionError;

/// Run-level error
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// The discovery session could not be opened or driven
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// Login failed; nothing was discovered and no worker started
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// Discovery could not start at all
    #[error("Discovery failed: {0}")]
    Discovery(String),
    /// Operation cancelled
    #[error("Scrape operation was cancelled")]
    Cancelled,
    /// Other errors
    #[error("Scrape error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;
