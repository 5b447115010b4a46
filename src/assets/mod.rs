//! Image asset download
//!
//! The extractor only decides *what* to fetch and *where* it goes;
//! [`AssetResolver`] does the fetching.

use futures::StreamExt;
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::utils::constants::CHROME_USER_AGENT;
use crate::utils::is_valid_url;

/// Per-request bound for image downloads
pub const ASSET_TIMEOUT: Duration = Duration::from_secs(10);

/// Images larger than this are abandoned mid-stream
pub const MAX_ASSET_BYTES: u64 = 25 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} exceeds the {limit} byte limit")]
    TooLarge { url: String, limit: u64 },

    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid asset target: {0}")]
    InvalidUrl(String),
}

/// Fetches one remote asset into a sub-folder of some output root
pub trait AssetResolver: Send + Sync + 'static {
    /// Save `url` as `sub_folder/file_name`, creating the folder if needed,
    /// and return the absolute local path.
    fn download(
        &self,
        url: &str,
        file_name: &str,
        sub_folder: &Path,
    ) -> impl Future<Output = Result<PathBuf, AssetError>> + Send;
}

/// Streams assets over HTTP into `root`
#[derive(Debug, Clone)]
pub struct HttpAssetResolver {
    client: Client,
    root: PathBuf,
}

impl HttpAssetResolver {
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialized.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(ASSET_TIMEOUT)
            .user_agent(CHROME_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            root: root.into(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn check_file_name(file_name: &str) -> Result<(), AssetError> {
    let bad = file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name == "."
        || file_name == "..";
    if bad {
        return Err(AssetError::InvalidUrl(format!("bad file name '{file_name}'")));
    }
    Ok(())
}

/// Write the body to `path` chunk by chunk, refusing bodies over the cap.
/// The caller owns removal of `path` on error.
async fn stream_to_file(response: reqwest::Response, path: &Path, url: &str) -> Result<(), AssetError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > MAX_ASSET_BYTES {
            return Err(AssetError::TooLarge {
                url: url.to_string(),
                limit: MAX_ASSET_BYTES,
            });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

impl AssetResolver for HttpAssetResolver {
    async fn download(&self, url: &str, file_name: &str, sub_folder: &Path) -> Result<PathBuf, AssetError> {
        if !is_valid_url(url) {
            return Err(AssetError::InvalidUrl(url.to_string()));
        }
        check_file_name(file_name)?;

        let response = self
            .client
            .get(url)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if response.content_length().unwrap_or(0) > MAX_ASSET_BYTES {
            return Err(AssetError::TooLarge {
                url: url.to_string(),
                limit: MAX_ASSET_BYTES,
            });
        }

        let folder = self.root.join(sub_folder);
        tokio::fs::create_dir_all(&folder).await?;
        let target = folder.join(file_name);
        let partial = folder.join(format!("{file_name}.part"));

        let saved = match stream_to_file(response, &partial, url).await {
            Ok(()) => tokio::fs::rename(&partial, &target).await.map_err(AssetError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        Ok(tokio::fs::canonicalize(&target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_file_names() {
        assert!(check_file_name("1.jpg").is_ok());
        assert!(check_file_name("../1.jpg").is_err());
        assert!(check_file_name("a\\b.jpg").is_err());
        assert!(check_file_name("").is_err());
    }
}
