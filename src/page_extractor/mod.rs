//! Product detail-page extraction.
//!
//! `ProductExtractor` runs an ordered list of independent field probes
//! against one loaded page: identifier, title, price, description, SKU,
//! tags, categories, the specification table and the image gallery.

// Sub-modules
pub mod images;
pub(crate) mod probes;
pub mod product;
pub mod schema;
pub mod spec_table;

// Re-exports for public API
pub use images::{filter_candidates, folder_for, pick_source};
pub use product::ProductExtractor;
pub use schema::ProductRecord;
pub use spec_table::{SpecTable, normalize_key, parse_rows};
