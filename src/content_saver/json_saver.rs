use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

use super::timestamped_file_name;

/// Timeout for blocking JSON serialization
/// Prevents hangs on pathological data structures
const BLOCKING_SERIALIZATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Write `rows` as a pretty-printed UTF-8 JSON array to
/// `output_dir/products_{timestamp}.json` and return the path.
pub async fn save_json(rows: Vec<serde_json::Value>, output_dir: &Path) -> Result<PathBuf> {
    let count = rows.len();

    // JSON serialization (keep spawn_blocking - CPU intensive)
    let blocking_task = tokio::task::spawn_blocking(move || serde_json::to_string_pretty(&rows));

    let json_str = match timeout(BLOCKING_SERIALIZATION_TIMEOUT, blocking_task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => return Err(anyhow::anyhow!("JSON serialization task panicked: {e}")),
        Err(_) => {
            log::warn!("JSON serialization timeout (timeout: {BLOCKING_SERIALIZATION_TIMEOUT:?})");
            return Err(anyhow::anyhow!(
                "JSON serialization timed out after {BLOCKING_SERIALIZATION_TIMEOUT:?}"
            ));
        }
    };

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(timestamped_file_name("json"));
    tokio::fs::write(&path, json_str)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("JSON saved: {} ({count} records)", path.display());
    Ok(path)
}
