//! Loading and validating `ScrapeConfig` from disk

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::path::Path;

use super::types::{KNOWN_FIELDS, ScrapeConfig};
use crate::utils::is_valid_url;

impl ScrapeConfig {
    /// Read a JSON config file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this layout, or fails [`ScrapeConfig::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Check the invariants the scrape engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_url(&self.base_url) {
            bail!("base_url must be an absolute http(s) URL, got '{}'", self.base_url);
        }
        if self.max_threads == 0 {
            bail!("max_threads must be at least 1");
        }
        if !self.page_load_delay.is_finite() || self.page_load_delay < 0.0 {
            bail!("page_load_delay must be a non-negative number of seconds");
        }
        if self.selectors.product_links.trim().is_empty() {
            bail!("selectors.product_links must not be empty");
        }
        if let Some(unknown) = self
            .fields
            .iter()
            .find(|f| !KNOWN_FIELDS.contains(&f.as_str()))
        {
            bail!("unknown field '{unknown}' in fields; expected one of {KNOWN_FIELDS:?}");
        }
        Regex::new(&self.oem_key_pattern)
            .with_context(|| format!("oem_key_pattern '{}' is not a valid regex", self.oem_key_pattern))?;

        if !self
            .database
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!("database.table_prefix may only contain ASCII letters, digits and '_'");
        }

        if self.login.enabled {
            if !is_valid_url(&self.login.url) {
                bail!("login.url must be an absolute http(s) URL when login is enabled");
            }
            if self.login.username.is_empty() || self.login.password.is_empty() {
                bail!("login.username and login.password are required when login is enabled");
            }
            let selectors = &self.login.selectors;
            if [&selectors.username, &selectors.password, &selectors.submit]
                .iter()
                .any(|s| s.trim().is_empty())
            {
                bail!("login.selectors needs username, password and submit");
            }
        }
        Ok(())
    }

    /// Force persistence on or off, as the CLI's `--db-only`/`--no-db` do
    pub fn override_database_enabled(&mut self, enabled: bool) {
        self.database.enabled = enabled;
    }
}
