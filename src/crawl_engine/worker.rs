//! One work unit: fresh session, credential injection, extraction, shutdown

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::cleanup::shutdown_session;
use super::shared::{SharedResults, StopFlag};
use crate::assets::AssetResolver;
use crate::page_extractor::ProductExtractor;
use crate::session::{BrowserSession, SessionCredential, SessionFactory, settle};

/// Shared state every work unit of one run reads
pub(crate) struct WorkUnitContext<F, A> {
    pub factory: Arc<F>,
    pub extractor: Arc<ProductExtractor<A>>,
    pub credential: SessionCredential,
    pub base_url: String,
    pub stop: StopFlag,
    pub results: SharedResults,
    pub cooldown: Duration,
}

/// How a work unit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitOutcome {
    /// A record was appended to the shared results
    Scraped,
    /// The page could not be loaded
    NoRecord,
    /// The browser session could not be opened
    SessionFailed,
    /// The stop flag was set before the unit began
    Skipped,
}

/// Attach the captured cookies to a fresh session.
///
/// Cookies can only be set for the origin currently loaded, so the base URL
/// is opened first and reloaded afterwards. A cookie the browser refuses is
/// skipped on its own.
pub(crate) async fn inject_credential<S: BrowserSession>(
    session: &S,
    credential: &SessionCredential,
    base_url: &str,
) {
    if credential.is_empty() {
        return;
    }
    if let Err(e) = session.navigate(base_url).await {
        warn!("Could not open {base_url} to attach cookies: {e}");
        return;
    }
    for cookie in credential.cookies() {
        if let Err(e) = session.add_cookie(cookie).await {
            debug!("Cookie '{}' rejected: {e}", cookie.name);
        }
    }
    if let Err(e) = session.reload().await {
        warn!("Reload after attaching cookies failed: {e}");
    }
}

/// Scrape one URL end to end. Never fails the run.
pub(crate) async fn run_work_unit<F, A>(url: String, ctx: Arc<WorkUnitContext<F, A>>) -> UnitOutcome
where
    F: SessionFactory,
    A: AssetResolver,
{
    if ctx.stop.is_stopped() {
        debug!("Stop requested, skipping {url}");
        return UnitOutcome::Skipped;
    }

    let session = match ctx.factory.open().await {
        Ok(session) => session,
        Err(e) => {
            warn!("Browser session for {url} failed: {e}");
            settle(ctx.cooldown).await;
            return UnitOutcome::SessionFailed;
        }
    };

    inject_credential(&session, &ctx.credential, &ctx.base_url).await;
    let record = ctx.extractor.extract(&url, &session).await;
    shutdown_session(session).await;

    let outcome = match record {
        Some(record) => {
            ctx.results.push(record);
            UnitOutcome::Scraped
        }
        None => UnitOutcome::NoRecord,
    };

    // Let the OS reap the browser before this slot launches another
    settle(ctx.cooldown).await;
    outcome
}
