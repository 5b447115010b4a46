//! Per-record projections applied before file output

use serde_json::{Value, json};

use crate::page_extractor::ProductRecord;

/// Maps one record to the JSON object that gets written out.
///
/// Any `Fn(&ProductRecord) -> Value` is a projection.
pub trait Projection: Send + Sync {
    fn project(&self, record: &ProductRecord) -> Value;
}

impl<F> Projection for F
where
    F: Fn(&ProductRecord) -> Value + Send + Sync,
{
    fn project(&self, record: &ProductRecord) -> Value {
        self(record)
    }
}

/// Every field of the record, as serde serializes it
#[derive(Debug, Clone, Copy, Default)]
pub struct FullRecord;

impl Projection for FullRecord {
    fn project(&self, record: &ProductRecord) -> Value {
        serde_json::to_value(record).unwrap_or_else(|e| {
            log::error!("Could not serialize {}: {e}", record.url);
            Value::Null
        })
    }
}

/// Name, SKU, price, source URL and whether any image was found
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactRecord;

impl Projection for CompactRecord {
    fn project(&self, record: &ProductRecord) -> Value {
        json!({
            "name": record.title,
            "sku_code": record.sku,
            "main_price": record.price,
            "source_url": record.url,
            "has_images": !record.images.is_empty(),
        })
    }
}

/// Apply `projection` to every record, keeping order
pub fn project_all<P: Projection + ?Sized>(records: &[ProductRecord], projection: &P) -> Vec<Value> {
    records.iter().map(|r| projection.project(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        let mut record = ProductRecord::new("42", "https://shop.test/p/42");
        record.title = Some("Brake Pad".into());
        record.sku = Some("BP-1".into());
        record.images = vec!["https://shop.test/img/a.jpg".into()];
        record
    }

    #[test]
    fn compact_projection_keeps_five_keys_in_order() {
        let value = CompactRecord.project(&record());
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "sku_code", "main_price", "source_url", "has_images"]);
        assert_eq!(value["has_images"], json!(true));
        assert!(value["main_price"].is_null());
    }

    #[test]
    fn closures_are_projections() {
        let only_id = |r: &ProductRecord| json!({ "id": r.external_id });
        let values = project_all(&[record()], &only_id);
        assert_eq!(values, vec![json!({ "id": "42" })]);
    }

    #[test]
    fn full_projection_matches_serde() {
        let record = record();
        assert_eq!(FullRecord.project(&record), serde_json::to_value(&record).unwrap());
    }
}
