use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::utils::constants::CHROME_USER_AGENT;

/// Resolved once per process; every session launch after the first reuses it.
static BROWSER_EXECUTABLE: OnceCell<PathBuf> = OnceCell::const_new();

/// Find Chrome/Chromium on the system.
///
/// `CHROMIUM_PATH` wins when it points at an existing file, then the usual
/// install locations, then `which` on Unix.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to a missing file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };

    if let Some(path) = candidates.iter().map(Path::new).find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Ok(path.to_path_buf());
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "google-chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found on this system");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen_shopscrape")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Locate or download the browser once; concurrent callers wait on the first.
pub async fn browser_executable() -> Result<PathBuf> {
    BROWSER_EXECUTABLE
        .get_or_try_init(|| async {
            match find_browser_executable() {
                Ok(path) => Ok(path),
                Err(_) => download_managed_browser().await,
            }
        })
        .await
        .cloned()
}

/// Launch one browser process on `user_data_dir`.
///
/// Returns the browser and the CDP handler task. The handler must keep
/// running for the browser to respond; abort it after `Browser::wait`.
pub async fn launch_browser(
    headless: bool,
    request_timeout: Duration,
    user_data_dir: &Path,
) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = browser_executable().await?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(request_timeout)
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    config_builder = if headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    config_builder = config_builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let msg = e.to_string();
                // chromiumoxide cannot decode every CDP event Chrome emits
                let benign = msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response");
                if benign {
                    trace!("Suppressed CDP decode error: {msg}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        trace!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}
