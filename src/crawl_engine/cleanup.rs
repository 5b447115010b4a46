//! Session shutdown
//!
//! Close comes before quit, and a failed close never skips the quit.

use log::{debug, warn};

use crate::session::BrowserSession;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Close the page, then terminate the browser, logging each failure.
pub async fn shutdown_session<S: BrowserSession>(mut session: S) -> CleanupResult {
    let mut errors = Vec::new();

    debug!(target: "shopscrape::cleanup", "Closing session page");
    if let Err(e) = session.close().await {
        warn!(target: "shopscrape::cleanup", "Failed to close session page: {e}");
        errors.push(format!("Page close failed: {e}"));
    }

    debug!(target: "shopscrape::cleanup", "Quitting session browser");
    if let Err(e) = session.quit().await {
        warn!(target: "shopscrape::cleanup", "Failed to quit session browser: {e}");
        errors.push(format!("Browser quit failed: {e}"));
    }

    if errors.is_empty() {
        CleanupResult::Success
    } else {
        CleanupResult::PartialFailure(errors)
    }
}
