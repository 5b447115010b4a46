//! `BrowserSession` over a real Chrome process (chromiumoxide / CDP)
//!
//! One session is one browser process with a private profile directory and
//! a single page. Nothing is pooled: a wedged renderer only ever takes down
//! the work unit that owns it.

use chromiumoxide_cdp::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::types::{ElementSnapshot, SessionCookie, SessionError};
use super::wait::with_session_timeout;
use super::{BrowserSession, SessionFactory};
use crate::browser_profile::{SESSION_PROFILE_PREFIX, create_unique_profile};
use crate::browser_setup::launch_browser;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

fn browser_err(e: impl std::fmt::Display) -> SessionError {
    SessionError::Browser(e.to_string())
}

/// Opens one headless (or headed) Chrome per session
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    headless: bool,
    timeout: Duration,
}

impl ChromiumSessionFactory {
    /// `timeout` bounds every navigation and CDP request
    #[must_use]
    pub fn new(headless: bool, timeout: Duration) -> Self {
        Self { headless, timeout }
    }
}

impl SessionFactory for ChromiumSessionFactory {
    type Session = ChromiumSession;

    async fn open(&self) -> Result<ChromiumSession, SessionError> {
        let profile = create_unique_profile(SESSION_PROFILE_PREFIX)
            .map_err(|e| SessionError::Launch(format!("{e:#}")))?;

        let (mut browser, handler) = launch_browser(self.headless, self.timeout, profile.path())
            .await
            .map_err(|e| SessionError::Launch(format!("{e:#}")))?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(SessionError::Launch(format!("failed to open page: {e}")));
            }
        };

        debug!("Opened browser session with profile {}", profile.path().display());
        Ok(ChromiumSession {
            browser,
            handler,
            page: Some(page),
            profile_dir: profile.into_path(),
            current_url: Mutex::new(None),
            timeout: self.timeout,
        })
    }
}

/// A live Chrome process driven over CDP
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    profile_dir: PathBuf,
    current_url: Mutex<Option<String>>,
    timeout: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, SessionError> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::Browser("page is closed".into()))
    }

    async fn first(&self, selector: &str) -> Result<Element, SessionError> {
        self.page()?
            .find_elements(selector)
            .await
            .map_err(browser_err)?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::not_found(selector))
    }

    fn cookie_param(&self, cookie: &SessionCookie) -> Result<CookieParam, SessionError> {
        let mut builder = CookieParam::builder()
            .name(cookie.name.clone())
            .value(cookie.value.clone())
            .secure(cookie.secure)
            .http_only(cookie.http_only);

        builder = match &cookie.domain {
            Some(domain) => builder
                .domain(domain.clone())
                .path(cookie.path.clone().unwrap_or_else(|| "/".to_string())),
            None => {
                let url = self.current_url.lock().clone().ok_or_else(|| {
                    SessionError::Browser("cookies without a domain need a loaded page".into())
                })?;
                builder.url(url)
            }
        };

        builder.build().map_err(SessionError::Browser)
    }
}

async fn snapshot(element: &Element, attributes: &[&str]) -> ElementSnapshot {
    let text = element.inner_text().await.ok().flatten().unwrap_or_default();
    let mut snap = ElementSnapshot {
        text,
        ..ElementSnapshot::default()
    };
    for name in attributes {
        if let Ok(Some(value)) = element.attribute(*name).await {
            snap.attributes.insert((*name).to_string(), value);
        }
    }
    snap
}

impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let page = self.page()?;
        with_session_timeout(
            async {
                page.goto(url).await.map_err(|e| SessionError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
                Ok(())
            },
            self.timeout,
            &format!("navigation to {url}"),
        )
        .await?;
        *self.current_url.lock() = Some(url.to_string());
        Ok(())
    }

    async fn reload(&self) -> Result<(), SessionError> {
        let page = self.page()?;
        with_session_timeout(
            async {
                page.reload().await.map_err(browser_err)?;
                Ok(())
            },
            self.timeout,
            "page reload",
        )
        .await
    }

    async fn query(&self, selector: &str, attributes: &[&str]) -> Result<Vec<ElementSnapshot>, SessionError> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(browser_err)?;
        let mut out = Vec::with_capacity(elements.len());
        for element in &elements {
            out.push(snapshot(element, attributes).await);
        }
        Ok(out)
    }

    async fn query_scoped(
        &self,
        scope: &str,
        selector: &str,
        attributes: &[&str],
    ) -> Result<Vec<ElementSnapshot>, SessionError> {
        let container = match self.first(scope).await {
            Ok(container) => container,
            Err(e) if e.is_missing() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let elements = container.find_elements(selector).await.map_err(browser_err)?;
        let mut out = Vec::with_capacity(elements.len());
        for element in &elements {
            out.push(snapshot(element, attributes).await);
        }
        Ok(out)
    }

    async fn query_rows(&self, table: &str, cells: &str) -> Result<Vec<Vec<String>>, SessionError> {
        let table = match self.first(table).await {
            Ok(table) => table,
            Err(e) if e.is_missing() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut rows = Vec::new();
        for row in table.find_elements("tr").await.map_err(browser_err)? {
            let mut texts = Vec::new();
            for cell in row.find_elements(cells).await.map_err(browser_err)? {
                texts.push(cell.inner_text().await.ok().flatten().unwrap_or_default());
            }
            rows.push(texts);
        }
        Ok(rows)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementSnapshot, SessionError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.first(selector).await {
                Ok(element) => return Ok(snapshot(&element, &[]).await),
                Err(e) if !e.is_missing() => return Err(e),
                Err(_) => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: format!("'{selector}'"),
                    secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        let element = self.first(selector).await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(browser_err)?;
        element.focus().await.map_err(browser_err)?;
        element.type_str(value).await.map_err(browser_err)?;
        Ok(())
    }

    async fn force_click(&self, selector: &str) -> Result<(), SessionError> {
        let element = self.first(selector).await?;
        element
            .call_js_fn("function() { this.click(); }", false)
            .await
            .map_err(browser_err)?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>, SessionError> {
        let cookies = self.page()?.get_cookies().await.map_err(browser_err)?;
        Ok(cookies
            .into_iter()
            .map(|c| SessionCookie {
                name: c.name,
                value: c.value,
                domain: Some(c.domain),
                path: Some(c.path),
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect())
    }

    async fn add_cookie(&self, cookie: &SessionCookie) -> Result<(), SessionError> {
        let param = self.cookie_param(cookie)?;
        self.page()?.set_cookie(param).await.map_err(browser_err)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.page.take() {
            Some(page) => page.close().await.map_err(browser_err),
            None => Ok(()),
        }
    }

    async fn quit(mut self) -> Result<(), SessionError> {
        let mut errors = Vec::new();

        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            errors.push(format!("page close failed: {e}"));
        }
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {e}");
            errors.push(format!("browser close failed: {e}"));
        }
        // Reap the process so Chrome doesn't log "not closed manually"
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
            errors.push(format!("browser wait failed: {e}"));
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            debug!(
                "Failed to remove profile directory {}: {e}",
                self.profile_dir.display()
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SessionError::Browser(errors.join("; ")))
        }
    }
}
