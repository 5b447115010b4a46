use anyhow::Result;
use url::Url;

use super::constants::THUMBNAIL_SUFFIXES;

/// Returns true when `url` parses and uses the http or https scheme.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Resolve an `href` found on `page_url` into an absolute URL.
///
/// Fragments are dropped so `#reviews` anchors don't create duplicate jobs.
pub fn resolve_href(page_url: &str, href: &str) -> Result<String> {
    let base = Url::parse(page_url)
        .map_err(|e| anyhow::anyhow!("Invalid page URL '{page_url}': {e}"))?;
    let mut joined = base
        .join(href.trim())
        .map_err(|e| anyhow::anyhow!("Cannot resolve '{href}' against '{page_url}': {e}"))?;
    joined.set_fragment(None);
    Ok(joined.to_string())
}

/// Returns true for WordPress-generated thumbnail renditions like `a-150x150.jpg`.
///
/// Only the file stem is inspected, so query strings never hide a suffix.
#[must_use]
pub fn is_thumbnail_url(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or(url).to_string());
    let file = path.rsplit('/').next().unwrap_or(&path);
    let stem = match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    };
    THUMBNAIL_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix))
}

/// File extension to use for a downloaded image.
///
/// Takes the last extension of the URL path when it is 1-4 ASCII
/// alphanumerics, otherwise `jpg`. Always lower-case.
#[must_use]
pub fn image_extension(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    file.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| (1..=4).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "jpg".to_string(), str::to_ascii_lowercase)
}

/// Extract the trailing run of ASCII digits, e.g. `product-1234` -> `1234`.
#[must_use]
pub fn trailing_digits(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    Some(&trimmed[start..])
}
