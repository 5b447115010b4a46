//! Scrape orchestration
//!
//! Phase one runs login and link discovery in a single session. Phase two
//! fans the discovered URLs out to work units, each with its own session,
//! never more than `max_threads` at a time.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use super::auth::SessionAuthenticator;
use super::cleanup::{CleanupResult, shutdown_session};
use super::crawl_types::{ScrapeError, ScrapeResult};
use super::discovery::LinkDiscoverer;
use super::progress::{NoOpProgress, ProgressReporter};
use super::shared::{FolderCounter, SharedResults, StopFlag};
use super::worker::{UnitOutcome, WorkUnitContext, run_work_unit};
use crate::assets::AssetResolver;
use crate::config::ScrapeConfig;
use crate::page_extractor::{ProductExtractor, ProductRecord};
use crate::session::{SessionCredential, SessionFactory};

/// Runs one complete scrape against a configured site.
pub struct ScrapeOrchestrator<F, A, P = NoOpProgress> {
    config: Arc<ScrapeConfig>,
    factory: Arc<F>,
    assets: Arc<A>,
    counter: Arc<FolderCounter>,
    stop: StopFlag,
    progress: Arc<P>,
}

impl<F, A> ScrapeOrchestrator<F, A, NoOpProgress>
where
    F: SessionFactory,
    A: AssetResolver,
{
    pub fn new(config: impl Into<Arc<ScrapeConfig>>, factory: F, assets: A) -> Self {
        Self {
            config: config.into(),
            factory: Arc::new(factory),
            assets: Arc::new(assets),
            counter: Arc::new(FolderCounter::new()),
            stop: StopFlag::new(),
            progress: Arc::new(NoOpProgress),
        }
    }
}

impl<F, A, P> ScrapeOrchestrator<F, A, P>
where
    F: SessionFactory,
    A: AssetResolver,
    P: ProgressReporter,
{
    /// Replace the progress reporter
    pub fn with_progress<Q: ProgressReporter>(self, progress: Q) -> ScrapeOrchestrator<F, A, Q> {
        ScrapeOrchestrator {
            config: self.config,
            factory: self.factory,
            assets: self.assets,
            counter: self.counter,
            stop: self.stop,
            progress: Arc::new(progress),
        }
    }

    /// Handle that cancels this run when stopped
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    #[must_use]
    pub fn counter(&self) -> Arc<FolderCounter> {
        Arc::clone(&self.counter)
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Authenticate, discover and scrape.
    ///
    /// Returns records in completion order. A stop request returns whatever
    /// finished before it; individual page failures never fail the run.
    ///
    /// # Errors
    ///
    /// Fails before any work unit starts when the OEM pattern is invalid,
    /// the discovery session cannot be opened, or login fails.
    pub async fn run(&self) -> ScrapeResult<Vec<ProductRecord>> {
        let start = Instant::now();
        let extractor = Arc::new(ProductExtractor::new(
            Arc::clone(&self.config),
            Arc::clone(&self.counter),
            Arc::clone(&self.assets),
        )?);

        let (credential, links) = self.prepare().await?;
        if links.is_empty() {
            warn!("No product links found");
            self.progress.report_completed(0);
            return Ok(Vec::new());
        }
        self.progress.report_links_discovered(links.len());

        let results = SharedResults::new();
        let ctx = Arc::new(WorkUnitContext {
            factory: Arc::clone(&self.factory),
            extractor,
            credential,
            base_url: self.config.base_url().to_string(),
            stop: self.stop.clone(),
            results: results.clone(),
            cooldown: self.config.session_cooldown(),
        });

        self.dispatch(links, ctx).await;

        let records = results.snapshot();
        info!(
            "Scraped {} products in {:.1}s",
            records.len(),
            start.elapsed().as_secs_f64()
        );
        self.progress.report_completed(records.len());
        Ok(records)
    }

    /// Login and discovery in one session that is always shut down.
    async fn prepare(&self) -> ScrapeResult<(SessionCredential, Vec<String>)> {
        let session = self.factory.open().await.map_err(ScrapeError::Session)?;

        let outcome: ScrapeResult<(SessionCredential, Vec<String>)> = async {
            let authenticator = SessionAuthenticator::new(self.config.login().clone());
            let credential = authenticator.authenticate(&session).await?;
            if authenticator.is_enabled() {
                self.progress.report_authenticated(credential.len());
            }

            info!("Collecting product links...");
            let discoverer = LinkDiscoverer::new(&self.config, self.stop.clone());
            let links = discoverer
                .discover(&session, self.config.base_url(), self.config.test_mode_limit())
                .await;
            info!("Found {} products in total", links.len());
            Ok((credential, links))
        }
        .await;

        if let CleanupResult::PartialFailure(errors) = shutdown_session(session).await {
            debug!("Discovery session shutdown reported {} errors", errors.len());
        }
        outcome
    }

    async fn dispatch(&self, links: Vec<String>, ctx: Arc<WorkUnitContext<F, A>>) {
        let total = links.len();
        let concurrency = self.config.max_threads().max(1);
        info!("Starting scrape of {total} products ({concurrency} threads)...");

        let mut pending: VecDeque<String> = links.into();
        let mut active_tasks = FuturesUnordered::new();
        let mut finished = 0usize;

        loop {
            if self.stop.is_stopped() && !pending.is_empty() {
                info!("Stop requested, dropping {} pending products", pending.len());
                pending.clear();
            }

            // Fill up to concurrency limit
            while active_tasks.len() < concurrency {
                let Some(url) = pending.pop_front() else {
                    break;
                };
                let ctx = Arc::clone(&ctx);
                active_tasks.push(tokio::spawn(async move {
                    let outcome = run_work_unit(url.clone(), ctx).await;
                    (url, outcome)
                }));
            }

            // Wait for at least one task to complete
            match active_tasks.next().await {
                Some(Ok((url, outcome))) => match outcome {
                    UnitOutcome::Scraped => {
                        finished += 1;
                        self.progress.report_unit_completed(&url, finished, total);
                    }
                    UnitOutcome::NoRecord | UnitOutcome::SessionFailed => {
                        finished += 1;
                        self.progress.report_unit_failed(&url, finished, total);
                    }
                    UnitOutcome::Skipped => debug!("Skipped {url}"),
                },
                Some(Err(e)) => {
                    finished += 1;
                    error!("Work unit panicked: {e}");
                }
                None => break, // All tasks completed
            }
        }
    }
}
