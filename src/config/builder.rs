//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! `build()` only exists once a base URL has been supplied, and it runs the
//! same validation as a config loaded from disk.

use anyhow::Result;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{
    DatabaseConfig, LoginConfig, ScrapeConfig, SelectorMap, default_fields,
    default_oem_key_pattern,
};
use crate::utils::{
    DEFAULT_MAX_THREADS, DEFAULT_PAGE_LOAD_DELAY_SECS, DEFAULT_SESSION_COOLDOWN_MS,
    DEFAULT_TIMEOUT_SECS,
};

// Type states for the builder
pub struct WithBaseUrl;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) draft: ScrapeConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            draft: ScrapeConfig {
                base_url: String::new(),
                max_threads: DEFAULT_MAX_THREADS,
                timeout: DEFAULT_TIMEOUT_SECS,
                headless: true,
                page_load_delay: DEFAULT_PAGE_LOAD_DELAY_SECS,
                output_dir: PathBuf::from("output"),
                images_dir: PathBuf::from("images"),
                download_images: true,
                fields: default_fields(),
                selectors: SelectorMap::default(),
                oem_key_pattern: default_oem_key_pattern(),
                login: LoginConfig::default(),
                database: DatabaseConfig::default(),
                test_mode_limit: None,
                session_cooldown_ms: DEFAULT_SESSION_COOLDOWN_MS,
            },
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

impl ScrapeConfigBuilder<()> {
    /// Set the catalog entry point.
    ///
    /// A bare host like `shop.example.com` is normalized to `https://`.
    pub fn base_url(self, url: impl Into<String>) -> ScrapeConfigBuilder<WithBaseUrl> {
        let url_string = url.into();

        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        let mut draft = self.draft;
        draft.base_url = normalized_url;
        ScrapeConfigBuilder {
            draft,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when the base URL is set
impl ScrapeConfigBuilder<WithBaseUrl> {
    pub fn build(self) -> Result<ScrapeConfig> {
        let config = self.draft;
        config.validate()?;
        Ok(config)
    }
}
