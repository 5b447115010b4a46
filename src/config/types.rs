//! Core configuration types for catalog scraping
//!
//! This module contains the main `ScrapeConfig` struct and the nested blocks
//! (selectors, login, database) that define a scrape run. Every field has a
//! serde default except `base_url`, so a minimal JSON file only names the site.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::{
    DEFAULT_MAX_THREADS, DEFAULT_PAGE_LOAD_DELAY_SECS, DEFAULT_SESSION_COOLDOWN_MS,
    DEFAULT_TIMEOUT_SECS,
};

/// Record fields that can be toggled through `fields`
pub const KNOWN_FIELDS: &[&str] = &[
    "title",
    "price",
    "description",
    "sku",
    "oem",
    "tags",
    "categories",
    "attributes",
    "images",
    "url",
];

/// Main configuration struct for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Catalog entry point. Listing walk starts here and cookies are
    /// attached on this origin.
    pub(crate) base_url: String,
    #[serde(default = "default_max_threads")]
    pub(crate) max_threads: usize,
    /// Per-wait and page-load bound, in seconds
    #[serde(default = "default_timeout")]
    pub(crate) timeout: u64,
    #[serde(default = "default_true")]
    pub(crate) headless: bool,
    /// Settle delay after each navigation, in (fractional) seconds
    #[serde(default = "default_page_load_delay")]
    pub(crate) page_load_delay: f64,
    #[serde(default = "default_output_dir")]
    pub(crate) output_dir: PathBuf,
    /// Relative to `output_dir`
    #[serde(default = "default_images_dir")]
    pub(crate) images_dir: PathBuf,
    #[serde(default = "default_true")]
    pub(crate) download_images: bool,
    #[serde(default = "default_fields")]
    pub(crate) fields: Vec<String>,
    #[serde(default)]
    pub(crate) selectors: SelectorMap,
    /// Case-insensitive match against specification-table keys
    #[serde(default = "default_oem_key_pattern")]
    pub(crate) oem_key_pattern: String,
    #[serde(default)]
    pub(crate) login: LoginConfig,
    #[serde(default)]
    pub(crate) database: DatabaseConfig,
    /// Cap on discovered product links; `None` walks every listing page
    #[serde(default)]
    pub(crate) test_mode_limit: Option<usize>,
    #[serde(default = "default_session_cooldown_ms")]
    pub(crate) session_cooldown_ms: u64,
}

/// CSS selectors for listing and detail pages.
///
/// Defaults target a stock WooCommerce storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectorMap {
    pub product_links: String,
    pub pagination_next: String,
    /// Container carrying the page-supplied product identifier
    pub product_id: String,
    /// Attribute on `product_id` whose trailing digits form the identifier
    pub product_id_attribute: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub sku: String,
    /// Dedicated OEM element, for themes that render it outside the spec table
    pub oem: Option<String>,
    pub tags: String,
    pub categories: String,
    pub details_table: String,
    pub description_tab: String,
    pub gallery: String,
    #[serde(alias = "images")]
    pub gallery_images: String,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            product_links: ".products .product a.woocommerce-LoopProduct-link".to_string(),
            pagination_next: ".next.page-numbers".to_string(),
            product_id: "div[id^='product-']".to_string(),
            product_id_attribute: "id".to_string(),
            title: "h1.product_title".to_string(),
            price: ".price .amount".to_string(),
            description: ".woocommerce-product-details__short-description".to_string(),
            sku: ".sku".to_string(),
            oem: None,
            tags: ".tagged_as a".to_string(),
            categories: ".posted_in a".to_string(),
            details_table: ".woocommerce-product-attributes, .shop_attributes, #tab-description table"
                .to_string(),
            description_tab: "#tab-title-description a, li.description_tab a".to_string(),
            gallery: ".woocommerce-product-gallery".to_string(),
            gallery_images: ".woocommerce-product-gallery__image img".to_string(),
        }
    }
}

/// Login-form selectors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoginSelectors {
    pub username: String,
    pub password: String,
    pub submit: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username: "#username".to_string(),
            password: "#password".to_string(),
            submit: "button[name='login']".to_string(),
        }
    }
}

/// Optional login step run once before discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoginConfig {
    pub enabled: bool,
    pub url: String,
    pub username: String,
    pub password: String,
    pub selectors: LoginSelectors,
    /// Pause between typing into consecutive fields
    pub input_delay_ms: u64,
    /// Pause after submit before cookies are captured
    pub settle_delay_secs: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            username: String::new(),
            password: String::new(),
            selectors: LoginSelectors::default(),
            input_delay_ms: 1000,
            settle_delay_secs: 5,
        }
    }
}

/// SQLite persistence settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub enabled: bool,
    /// sqlx connection string, e.g. `sqlite://output/products.db`
    pub url: String,
    pub table_prefix: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "sqlite://output/products.db".to_string(),
            table_prefix: "wp_".to_string(),
            max_connections: 4,
        }
    }
}

fn default_max_threads() -> usize {
    DEFAULT_MAX_THREADS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_page_load_delay() -> f64 {
    DEFAULT_PAGE_LOAD_DELAY_SECS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

pub(crate) fn default_fields() -> Vec<String> {
    KNOWN_FIELDS.iter().map(|f| (*f).to_string()).collect()
}

pub(crate) fn default_oem_key_pattern() -> String {
    "(?i)oem".to_string()
}

fn default_session_cooldown_ms() -> u64 {
    DEFAULT_SESSION_COOLDOWN_MS
}
