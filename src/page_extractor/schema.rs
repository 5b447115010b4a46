use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product as scraped from its detail page.
///
/// Collections are never optional: absence is the empty container. A record
/// is not mutated after the extractor hands it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Page-supplied identifier, or `gen_{n}` synthesized for this run only
    pub external_id: String,
    pub title: Option<String>,
    /// Raw display string, currency symbol and separators included
    pub price: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub oem: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Specification-table rows; an empty cell is `None`, never dropped
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<String>>,
    /// Local paths when images were downloaded, remote URLs otherwise
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub url: String,
    pub scraped_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Empty record for `url`, stamped now
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: None,
            price: None,
            description: None,
            sku: None,
            oem: None,
            tags: Vec::new(),
            attributes: BTreeMap::new(),
            images: Vec::new(),
            categories: Vec::new(),
            url: url.into(),
            scraped_at: Utc::now(),
        }
    }

    /// Title for logs and folder names, falling back to the URL
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}
