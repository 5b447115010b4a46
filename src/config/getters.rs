//! Getter methods for `ScrapeConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from a `ScrapeConfig` instance.

use std::path::Path;
use std::time::Duration;

use super::types::{DatabaseConfig, LoginConfig, ScrapeConfig, SelectorMap};

impl ScrapeConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Settle delay as a `Duration`; negative or non-finite values collapse to zero
    #[must_use]
    pub fn page_load_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.page_load_delay).unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    #[must_use]
    pub fn download_images(&self) -> bool {
        self.download_images
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether the named record field should be extracted
    #[must_use]
    pub fn wants(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    #[must_use]
    pub fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    #[must_use]
    pub fn oem_key_pattern(&self) -> &str {
        &self.oem_key_pattern
    }

    #[must_use]
    pub fn login(&self) -> &LoginConfig {
        &self.login
    }

    #[must_use]
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    #[must_use]
    pub fn test_mode_limit(&self) -> Option<usize> {
        self.test_mode_limit
    }

    #[must_use]
    pub fn session_cooldown(&self) -> Duration {
        Duration::from_millis(self.session_cooldown_ms)
    }
}
