//! Browser automation seam
//!
//! The crawl engine only talks to [`BrowserSession`] and [`SessionFactory`].
//! `chromium` drives a real browser over CDP; `static_dom` (behind the
//! `testing` feature) replays fixed HTML in-process and is what the engine's
//! tests run against.

pub mod chromium;
#[cfg(any(test, feature = "testing"))]
pub mod static_dom;
pub mod types;
pub mod wait;

use std::future::Future;
use std::time::Duration;

pub use chromium::{ChromiumSession, ChromiumSessionFactory};
#[cfg(any(test, feature = "testing"))]
pub use static_dom::{ClickEffect, SessionStats, StaticDomFactory, StaticDomSession, StaticSite};
pub use types::{ElementSnapshot, SessionCookie, SessionCredential, SessionError};
pub use wait::{settle, with_session_timeout};

/// One isolated browser with its own cookie jar and a single page.
///
/// Sessions are never shared between concurrent work units; `Sync` is only
/// required so `&Session` can be held across `.await` in spawned tasks.
pub trait BrowserSession: Send + Sync {
    /// Load `url` in the session's page
    fn navigate(&self, url: &str) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Reload the current page
    fn reload(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// All elements matching `selector`, in document order, with the text
    /// and the requested attributes of each. No match is `Ok(vec![])`.
    fn query(
        &self,
        selector: &str,
        attributes: &[&str],
    ) -> impl Future<Output = Result<Vec<ElementSnapshot>, SessionError>> + Send;

    /// Like [`query`](Self::query), but only below the first element that
    /// matches `scope`. A missing scope yields no elements.
    fn query_scoped(
        &self,
        scope: &str,
        selector: &str,
        attributes: &[&str],
    ) -> impl Future<Output = Result<Vec<ElementSnapshot>, SessionError>> + Send;

    /// Cell texts of every `tr` in the first table matching `table`, where
    /// cells are the row's elements matching `cells`.
    fn query_rows(
        &self,
        table: &str,
        cells: &str,
    ) -> impl Future<Output = Result<Vec<Vec<String>>, SessionError>> + Send;

    /// Poll until `selector` matches, returning the first match.
    fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<ElementSnapshot, SessionError>> + Send;

    /// Replace the value of the first input matching `selector`
    fn fill(&self, selector: &str, value: &str) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Dispatch `click()` from script on the first match, bypassing
    /// overlays that swallow pointer events.
    fn force_click(&self, selector: &str) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Every cookie visible to the session
    fn cookies(&self) -> impl Future<Output = Result<Vec<SessionCookie>, SessionError>> + Send;

    /// Attach one cookie to the current origin
    fn add_cookie(&self, cookie: &SessionCookie) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Close the page. The browser process stays up until [`quit`](Self::quit).
    fn close(&mut self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Terminate the browser and release everything the session owns
    fn quit(self) -> impl Future<Output = Result<(), SessionError>> + Send
    where
        Self: Sized;
}

/// Opens fresh, fully isolated sessions
pub trait SessionFactory: Send + Sync + 'static {
    type Session: BrowserSession + 'static;

    fn open(&self) -> impl Future<Output = Result<Self::Session, SessionError>> + Send;
}
