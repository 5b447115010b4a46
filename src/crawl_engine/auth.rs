//! One-shot login that captures a portable cookie set

use log::{error, info};
use std::time::Duration;

use super::crawl_types::{ScrapeError, ScrapeResult};
use crate::config::LoginConfig;
use crate::session::{BrowserSession, SessionCredential, settle};
use crate::utils::LOGIN_FORM_TIMEOUT_SECS;

/// Drives the login form in one session and captures its cookies.
///
/// Steps are strictly sequential: username, password, submit, settle,
/// capture. Any selector failure is an `Authentication` error and callers
/// abort the run on it.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    login: LoginConfig,
    form_timeout: Duration,
}

impl SessionAuthenticator {
    #[must_use]
    pub fn new(login: LoginConfig) -> Self {
        Self {
            login,
            form_timeout: Duration::from_secs(LOGIN_FORM_TIMEOUT_SECS),
        }
    }

    /// Override how long to wait for the login form to render
    #[must_use]
    pub fn with_form_timeout(mut self, timeout: Duration) -> Self {
        self.form_timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.login.enabled
    }

    /// Log in with `session`; a disabled login is an empty credential.
    pub async fn authenticate<S: BrowserSession>(&self, session: &S) -> ScrapeResult<SessionCredential> {
        if !self.login.enabled {
            return Ok(SessionCredential::empty());
        }

        info!("Login attempt: {}", self.login.url);
        match self.submit_form(session).await {
            Ok(credential) => {
                info!(
                    "Login request sent, captured {} cookies",
                    credential.len()
                );
                Ok(credential)
            }
            Err(e) => {
                error!("Login failed: {e}");
                Err(e)
            }
        }
    }

    async fn submit_form<S: BrowserSession>(&self, session: &S) -> ScrapeResult<SessionCredential> {
        let selectors = &self.login.selectors;
        let input_delay = Duration::from_millis(self.login.input_delay_ms);
        let fail = |step: &str, e: crate::session::SessionError| {
            ScrapeError::Authentication(format!("{step}: {e}"))
        };

        session
            .navigate(&self.login.url)
            .await
            .map_err(|e| fail("loading login page", e))?;

        session
            .wait_for(&selectors.username, self.form_timeout)
            .await
            .map_err(|e| fail("login form", e))?;

        session
            .fill(&selectors.username, &self.login.username)
            .await
            .map_err(|e| fail("username field", e))?;
        settle(input_delay).await;

        session
            .fill(&selectors.password, &self.login.password)
            .await
            .map_err(|e| fail("password field", e))?;
        settle(input_delay).await;

        session
            .force_click(&selectors.submit)
            .await
            .map_err(|e| fail("submit button", e))?;
        settle(Duration::from_secs(self.login.settle_delay_secs)).await;

        let cookies = session
            .cookies()
            .await
            .map_err(|e| fail("reading cookies", e))?;
        Ok(SessionCredential::from_cookies(cookies))
    }
}
