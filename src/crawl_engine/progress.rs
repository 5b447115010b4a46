//! Progress reporting abstraction for scrape runs
//!
//! Defines the `ProgressReporter` trait for lifecycle event reporting and
//! provides a no-op and a logging implementation.

use log::info;

use crate::utils::PROGRESS_LOG_EVERY;

/// Trait for reporting scrape progress at key lifecycle events
///
/// Called from worker tasks concurrently, so implementations must be
/// cheap and thread-safe.
pub trait ProgressReporter: Send + Sync + 'static {
    /// Login finished; `cookies` is the size of the captured credential
    fn report_authenticated(&self, cookies: usize);

    /// Discovery finished with `total` product links
    fn report_links_discovered(&self, total: usize);

    /// A work unit produced a record. `finished` counts every unit that has
    /// ended so far, successful or not.
    fn report_unit_completed(&self, url: &str, finished: usize, total: usize);

    /// A work unit ended without a record
    fn report_unit_failed(&self, url: &str, finished: usize, total: usize);

    /// The run returned `records` records
    fn report_completed(&self, records: usize);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_authenticated(&self, _cookies: usize) {}

    #[inline(always)]
    fn report_links_discovered(&self, _total: usize) {}

    #[inline(always)]
    fn report_unit_completed(&self, _url: &str, _finished: usize, _total: usize) {}

    #[inline(always)]
    fn report_unit_failed(&self, _url: &str, _finished: usize, _total: usize) {}

    #[inline(always)]
    fn report_completed(&self, _records: usize) {}
}

/// Logs `finished/total` every few units, the way an operator tails a run
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProgress;

impl LoggingProgress {
    fn tick(finished: usize, total: usize) {
        if finished % PROGRESS_LOG_EVERY == 0 || finished == total {
            info!(target: "shopscrape::progress", "Completed: {finished}/{total}");
        }
    }
}

impl ProgressReporter for LoggingProgress {
    fn report_authenticated(&self, cookies: usize) {
        info!(target: "shopscrape::progress", "Logged in, captured {cookies} cookies");
    }

    fn report_links_discovered(&self, total: usize) {
        info!(target: "shopscrape::progress", "Found {total} products in total");
    }

    fn report_unit_completed(&self, _url: &str, finished: usize, total: usize) {
        Self::tick(finished, total);
    }

    fn report_unit_failed(&self, _url: &str, finished: usize, total: usize) {
        Self::tick(finished, total);
    }

    fn report_completed(&self, records: usize) {
        info!(target: "shopscrape::progress", "Scrape finished with {records} records");
    }
}
