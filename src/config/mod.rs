//! Configuration module for catalog scraping
//!
//! This module provides the `ScrapeConfig` struct, its type-safe builder,
//! and JSON file loading with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod loading;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithBaseUrl};
pub use types::{DatabaseConfig, KNOWN_FIELDS, LoginConfig, LoginSelectors, ScrapeConfig, SelectorMap};
