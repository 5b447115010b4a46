//! Detail-page extraction into a [`ProductRecord`]

use log::{error, info};
use regex::Regex;
use std::sync::Arc;

use super::schema::ProductRecord;
use super::{images, probes, spec_table};
use crate::assets::AssetResolver;
use crate::config::ScrapeConfig;
use crate::crawl_engine::crawl_types::ScrapeError;
use crate::crawl_engine::shared::FolderCounter;
use crate::session::{BrowserSession, settle};

/// Turns one detail page into one record.
///
/// Each field is an independent probe; a missing or slow element leaves
/// that field empty and extraction moves on. Only a failed navigation
/// loses the record.
pub struct ProductExtractor<A> {
    config: Arc<ScrapeConfig>,
    oem_key: Regex,
    counter: Arc<FolderCounter>,
    assets: Arc<A>,
}

impl<A: AssetResolver> ProductExtractor<A> {
    /// # Errors
    ///
    /// `ScrapeError::Config` when the OEM key pattern does not compile.
    pub fn new(
        config: Arc<ScrapeConfig>,
        counter: Arc<FolderCounter>,
        assets: Arc<A>,
    ) -> Result<Self, ScrapeError> {
        let oem_key = Regex::new(config.oem_key_pattern()).map_err(|e| {
            ScrapeError::Config(format!("invalid oem_key_pattern '{}': {e}", config.oem_key_pattern()))
        })?;
        Ok(Self {
            config,
            oem_key,
            counter,
            assets,
        })
    }

    /// Extract `url` using an already-prepared `session`.
    ///
    /// Returns `None` only when the page itself could not be loaded.
    pub async fn extract<S: BrowserSession>(&self, url: &str, session: &S) -> Option<ProductRecord> {
        if let Err(e) = session.navigate(url).await {
            error!("Product scrape error {url}: {e}");
            return None;
        }
        settle(self.config.page_load_delay()).await;

        let config = &self.config;
        let selectors = config.selectors();

        let external_id = match probes::external_id(session, selectors, url).await {
            Some(id) => id,
            None => format!("gen_{}", self.counter.next()),
        };
        let mut record = ProductRecord::new(external_id, url);

        if config.wants("title") {
            record.title = probes::title(session, &selectors.title, config.timeout(), url).await;
        }
        if config.wants("price") {
            record.price = probes::price(session, &selectors.price, url).await;
        }
        if config.wants("description") {
            record.description = probes::text(session, &selectors.description, url).await;
        }
        if config.wants("sku")
            && let Some(sku) = probes::sku(session, &selectors.sku, url).await
        {
            record.sku = Some(sku);
        }
        if config.wants("oem")
            && let Some(oem_selector) = &selectors.oem
            && let Some(raw) = probes::text(session, oem_selector, url).await
        {
            record.oem = Some(self.strip_oem_label(&raw));
        }
        if config.wants("tags") {
            let tags = probes::texts(session, &selectors.tags, url).await;
            if !tags.is_empty() {
                record.tags = tags;
            }
        }
        if config.wants("categories") {
            let categories = probes::texts(session, &selectors.categories, url).await;
            if !categories.is_empty() {
                record.categories = categories;
            }
        }

        if config.wants("attributes") || config.wants("oem") {
            let table = spec_table::read(session, selectors, &self.oem_key, url).await;
            if config.wants("oem") && table.oem.is_some() {
                record.oem = table.oem;
            }
            if config.wants("attributes") {
                record.attributes = table.attributes;
            }
        }

        if config.wants("images") {
            let urls = images::gallery_urls(session, selectors, url).await;
            record.images = if config.download_images() {
                images::download_all(
                    self.assets.as_ref(),
                    &self.counter,
                    config.images_dir(),
                    record.title.as_deref().unwrap_or_default(),
                    &urls,
                )
                .await
            } else {
                urls
            };
        }

        info!("Scraped: {}", record.display_name());
        Some(record)
    }

    /// `"OEM Nömrə: 55250-2B000"` -> `"55250-2B000"`; unlabeled text is kept
    fn strip_oem_label(&self, raw: &str) -> String {
        match raw.rsplit_once(':') {
            Some((label, value)) if self.oem_key.is_match(label) => value.trim().to_string(),
            _ => raw.trim().to_string(),
        }
    }
}
