//! Shared configuration constants for shopscrape
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default worker count: 5 concurrent browser sessions
///
/// Each worker launches its own Chrome process, so memory grows roughly
/// linearly (~150-250MB per session). Five is safe on an 8GB machine.
pub const DEFAULT_MAX_THREADS: usize = 5;

/// Default bound for a single DOM wait or page load, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default settle delay after navigation, in seconds
///
/// WooCommerce themes commonly lazy-render galleries and price blocks
/// after `DOMContentLoaded`.
pub const DEFAULT_PAGE_LOAD_DELAY_SECS: f64 = 2.0;

/// Pause after a work unit closes its browser, in milliseconds
///
/// Gives the OS time to reap the Chrome process tree before the slot
/// launches the next one.
pub const DEFAULT_SESSION_COOLDOWN_MS: u64 = 500;

/// Wait bound for the login form to appear, in seconds
pub const LOGIN_FORM_TIMEOUT_SECS: u64 = 15;

/// Progress is logged every N completed work units
pub const PROGRESS_LOG_EVERY: usize = 5;

/// Folder name used when sanitization leaves nothing behind
pub const PLACEHOLDER_FOLDER_NAME: &str = "UNKNOWN";

/// Price selector variants, most specific first.
///
/// Sale prices render inside `<ins>` after the struck-through original,
/// so the last match of a variant is preferred.
pub const PRICE_SELECTOR_VARIANTS: &[&str] = &[
    ".summary .price ins .woocommerce-Price-amount",
    ".summary .price .woocommerce-Price-amount",
    ".summary .price .amount",
    ".price ins .amount",
    ".price .woocommerce-Price-amount",
    ".amount",
];

/// Scoped SKU selector tried before the configured bare selector
pub const SCOPED_SKU_SELECTOR: &str = ".product_meta .sku";

/// Image attributes in order of preference: full-size, lazy-load, rendered
pub const IMAGE_SOURCE_ATTRIBUTES: &[&str] = &["data-large_image", "data-src", "src"];

/// WordPress-generated thumbnail size suffixes that are never worth downloading
pub const THUMBNAIL_SUFFIXES: &[&str] = &[
    "-32x32", "-50x50", "-64x64", "-100x100", "-150x150", "-180x180", "-300x300", "-324x324",
];

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
/// Next update: 2025-04-29 (quarterly schedule)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
