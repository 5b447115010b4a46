use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::timestamped_file_name;

/// Write `rows` as CSV to `output_dir/products_{timestamp}.csv`.
///
/// The header is the key set of the first row. Nulls become empty cells;
/// arrays and objects are written as compact JSON. Returns `None` without
/// touching the disk when `rows` is empty.
pub async fn save_csv(rows: Vec<Value>, output_dir: &Path) -> Result<Option<PathBuf>> {
    if rows.is_empty() {
        log::warn!("No data for CSV");
        return Ok(None);
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(timestamped_file_name("csv"));

    let target = path.clone();
    let count = rows.len();
    tokio::task::spawn_blocking(move || write_rows(&rows, &target))
        .await
        .context("CSV writer task panicked")??;

    log::info!("CSV saved: {} ({count} records)", path.display());
    Ok(Some(path))
}

fn write_rows(rows: &[Value], path: &Path) -> Result<()> {
    let header: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    };

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&header)?;

    for row in rows {
        let cells: Vec<String> = match row {
            Value::Object(map) => header
                .iter()
                .map(|key| map.get(key).map(cell).unwrap_or_default())
                .collect(),
            other => vec![cell(other)],
        };
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
