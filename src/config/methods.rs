//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;

use super::builder::ScrapeConfigBuilder;
use super::types::{DatabaseConfig, LoginConfig, SelectorMap};

impl<State> ScrapeConfigBuilder<State> {
    /// Number of concurrent browser sessions used for detail pages.
    ///
    /// Each session is a separate Chrome process. Memory scales roughly
    /// linearly with this value.
    #[must_use]
    pub fn max_threads(mut self, threads: usize) -> Self {
        self.draft.max_threads = threads;
        self
    }

    /// Bound for every DOM wait and page load, in seconds
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.draft.timeout = secs;
        self
    }

    /// Set browser headless mode (visible vs invisible browser window)
    ///
    /// Headed mode is useful while tuning selectors against a new theme. It
    /// requires a display server and roughly doubles per-session memory.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.draft.headless = headless;
        self
    }

    /// Settle delay after navigation, in seconds. Fractions are honored.
    #[must_use]
    pub fn page_load_delay(mut self, secs: f64) -> Self {
        self.draft.page_load_delay = secs;
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.images_dir = dir.into();
        self
    }

    #[must_use]
    pub fn download_images(mut self, download: bool) -> Self {
        self.draft.download_images = download;
        self
    }

    /// Restrict extraction to the named record fields
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn selectors(mut self, selectors: SelectorMap) -> Self {
        self.draft.selectors = selectors;
        self
    }

    #[must_use]
    pub fn oem_key_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.draft.oem_key_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn login(mut self, login: LoginConfig) -> Self {
        self.draft.login = login;
        self
    }

    #[must_use]
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.draft.database = database;
        self
    }

    /// Cap the number of discovered product links
    #[must_use]
    pub fn test_mode_limit(mut self, limit: Option<usize>) -> Self {
        self.draft.test_mode_limit = limit;
        self
    }

    /// Pause after each work unit before its slot is reused, in milliseconds
    #[must_use]
    pub fn session_cooldown_ms(mut self, ms: u64) -> Self {
        self.draft.session_cooldown_ms = ms;
        self
    }
}
