//! Flat-file output of scraped records

// Module declarations
mod csv_saver;
mod json_saver;
pub mod projection;

// Re-export public API from csv_saver module
pub use csv_saver::save_csv;

// Re-export public API from json_saver module
pub use json_saver::save_json;

// Re-export public API from projection module
pub use projection::{CompactRecord, FullRecord, Projection, project_all};

/// `products_{YYYYmmdd_HHMMSS}.{extension}` for the current local time
#[must_use]
pub fn timestamped_file_name(extension: &str) -> String {
    format!(
        "products_{}.{extension}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_has_timestamp_shape() {
        let name = timestamped_file_name("json");
        let stamp = name
            .strip_prefix("products_")
            .and_then(|rest| rest.strip_suffix(".json"))
            .unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
