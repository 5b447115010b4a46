//! Gallery image resolution and download
//!
//! Only the gallery container is searched, so related-product thumbnails
//! and logos elsewhere on the page never show up in a record.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::probes::swallow;
use crate::assets::AssetResolver;
use crate::config::SelectorMap;
use crate::crawl_engine::shared::FolderCounter;
use crate::session::{BrowserSession, ElementSnapshot};
use crate::utils::{
    IMAGE_SOURCE_ATTRIBUTES, image_extension, is_thumbnail_url, is_valid_url, resolve_href,
    sanitize_folder_name,
};

/// Preferred source of one `<img>`: full-size, then lazy-load, then `src`
#[must_use]
pub fn pick_source(element: &ElementSnapshot) -> Option<&str> {
    IMAGE_SOURCE_ATTRIBUTES
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Resolve candidates against `page_url`, then drop non-http(s) URLs and
/// thumbnail renditions, dedupe keeping first-seen order
#[must_use]
pub fn filter_candidates<I, S>(page_url: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let url = resolve_href(page_url, candidate.as_ref()).ok()?;
            if !is_valid_url(&url) || is_thumbnail_url(&url) {
                return None;
            }
            seen.insert(url.clone()).then_some(url)
        })
        .collect()
}

/// Image URLs in the gallery, filtered and in DOM order
pub(crate) async fn gallery_urls<S: BrowserSession>(
    session: &S,
    selectors: &SelectorMap,
    url: &str,
) -> Vec<String> {
    let elements = swallow(
        "gallery images",
        url,
        session
            .query_scoped(&selectors.gallery, &selectors.gallery_images, IMAGE_SOURCE_ATTRIBUTES)
            .await,
    )
    .unwrap_or_default();

    filter_candidates(url, elements.iter().filter_map(pick_source))
}

/// `{images_dir}/{n}_{SANITIZED_TITLE}`
#[must_use]
pub fn folder_for(images_dir: &std::path::Path, counter: u64, title: &str) -> PathBuf {
    images_dir.join(format!("{counter}_{}", sanitize_folder_name(title)))
}

/// Download `urls` as `1.ext`, `2.ext`, ... into one freshly numbered folder.
///
/// Returns the local paths that resolved; failed downloads are dropped.
/// Allocates no folder number when `urls` is empty.
pub(crate) async fn download_all<A: AssetResolver>(
    assets: &A,
    counter: &FolderCounter,
    images_dir: &std::path::Path,
    title: &str,
    urls: &[String],
) -> Vec<String> {
    if urls.is_empty() {
        return Vec::new();
    }

    let folder = folder_for(images_dir, counter.next(), title);
    let mut local = Vec::with_capacity(urls.len());
    for (index, image_url) in urls.iter().enumerate() {
        let file_name = format!("{}.{}", index + 1, image_extension(image_url));
        match assets.download(image_url, &file_name, &folder).await {
            Ok(path) => {
                debug!("Saved {image_url} -> {}", path.display());
                local.push(path.to_string_lossy().into_owned());
            }
            Err(e) => warn!("Image download failed for {image_url}: {e}"),
        }
    }
    info!(
        "Downloaded {}/{} images into {}",
        local.len(),
        urls.len(),
        folder.display()
    );
    local
}
