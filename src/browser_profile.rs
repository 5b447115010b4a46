//! Per-session Chrome profile directories
//!
//! Every scrape session launches its own browser, so every session gets its
//! own UUID-named profile. Two Chrome processes sharing a profile fight over
//! `SingletonLock` and the second one exits immediately.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix used for scrape-session profile directories under the temp dir
pub const SESSION_PROFILE_PREFIX: &str = "shopscrape_chrome";

/// RAII handle for a profile directory
///
/// Removes the directory on drop unless `into_path()` hands ownership to
/// whoever shuts the browser down.
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the handle and return the path, disabling auto-cleanup
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            debug!("Removing unused profile directory {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!("Failed to remove profile directory {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Create `{temp}/{prefix}_{uuid}` and return an owning handle.
///
/// `create_dir` (not `create_dir_all`) makes a UUID collision an error
/// instead of two browsers silently sharing a profile.
pub fn create_unique_profile(prefix: &str) -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4()));

    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory: {}", path.display());
    Ok(BrowserProfile {
        path,
        cleanup_on_drop: true,
    })
}
