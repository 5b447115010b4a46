//! Timeout utilities for session operations
//!
//! Every CDP round-trip can hang on a wedged renderer, so anything that
//! talks to the browser goes through [`with_session_timeout`].

use std::future::Future;
use std::time::Duration;

use super::types::SessionError;

/// Bound `operation` by `timeout`, naming `what` in the timeout error.
pub async fn with_session_timeout<F, T>(
    operation: F,
    timeout: Duration,
    what: &str,
) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout {
            what: what.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

/// Sleep for a settle delay; zero returns immediately.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
