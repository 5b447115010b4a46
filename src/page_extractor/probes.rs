//! Best-effort field probes
//!
//! Each probe returns `Option<T>`: a missing element, a timeout or a browser
//! hiccup all end up as `None` and never stop the probes after it.

use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SelectorMap;
use crate::session::{BrowserSession, ElementSnapshot, SessionError};
use crate::utils::{PRICE_SELECTOR_VARIANTS, SCOPED_SKU_SELECTOR, trailing_digits};

/// Turn a probe result into an `Option`, logging anything unexpected.
pub(crate) fn swallow<T>(field: &str, url: &str, result: Result<T, SessionError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_missing() => {
            debug!("{field} not found on {url}: {e}");
            None
        }
        Err(e) => {
            warn!("{field} probe failed on {url}: {e}");
            None
        }
    }
}

fn first_text(elements: &[ElementSnapshot]) -> Option<String> {
    elements
        .iter()
        .find_map(ElementSnapshot::trimmed_text)
        .map(str::to_string)
}

fn last_text(elements: &[ElementSnapshot]) -> Option<String> {
    elements
        .iter()
        .rev()
        .find_map(ElementSnapshot::trimmed_text)
        .map(str::to_string)
}

/// Non-empty trimmed text of every match, in document order
pub(crate) async fn texts<S: BrowserSession>(session: &S, selector: &str, url: &str) -> Vec<String> {
    swallow(selector, url, session.query(selector, &[]).await)
        .unwrap_or_default()
        .iter()
        .filter_map(ElementSnapshot::trimmed_text)
        .map(str::to_string)
        .collect()
}

/// Trimmed text of the first non-empty match
pub(crate) async fn text<S: BrowserSession>(session: &S, selector: &str, url: &str) -> Option<String> {
    let elements = swallow(selector, url, session.query(selector, &[]).await)?;
    first_text(&elements)
}

/// Identifier from the product container, e.g. `<div id="product-1234">` -> `1234`
pub(crate) async fn external_id<S: BrowserSession>(
    session: &S,
    selectors: &SelectorMap,
    url: &str,
) -> Option<String> {
    let attribute = selectors.product_id_attribute.as_str();
    let elements = swallow(
        "product id",
        url,
        session.query(&selectors.product_id, &[attribute]).await,
    )?;
    elements
        .iter()
        .filter_map(|el| el.attr(attribute))
        .find_map(trailing_digits)
        .map(str::to_string)
}

/// Title, waiting up to `timeout` for it to render
pub(crate) async fn title<S: BrowserSession>(
    session: &S,
    selector: &str,
    timeout: Duration,
    url: &str,
) -> Option<String> {
    swallow("title", url, session.wait_for(selector, timeout).await)?
        .trimmed_text()
        .map(str::to_string)
}

/// Price from the first selector variant that renders any text.
///
/// Within a variant the last match wins: themes print the struck-through
/// regular price first and the sale price after it.
pub(crate) async fn price<S: BrowserSession>(session: &S, fallback: &str, url: &str) -> Option<String> {
    for variant in PRICE_SELECTOR_VARIANTS {
        let Some(elements) = swallow("price", url, session.query(variant, &[]).await) else {
            continue;
        };
        if let Some(found) = last_text(&elements) {
            return Some(found);
        }
    }
    text(session, fallback, url).await
}

/// SKU from the scoped meta block first, then the bare selector.
pub(crate) async fn sku<S: BrowserSession>(session: &S, fallback: &str, url: &str) -> Option<String> {
    let raw = match text(session, SCOPED_SKU_SELECTOR, url).await {
        Some(found) => found,
        None => text(session, fallback, url).await?,
    };
    let cleaned = raw
        .strip_prefix("SKU:")
        .map_or(raw.as_str(), str::trim)
        .to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(text: &str) -> ElementSnapshot {
        ElementSnapshot {
            text: text.to_string(),
            ..ElementSnapshot::default()
        }
    }

    #[test]
    fn last_non_empty_text_wins() {
        let found = last_text(&[el("100 ₼"), el("80 ₼"), el("  ")]);
        assert_eq!(found.as_deref(), Some("80 ₼"));
        assert_eq!(last_text(&[el(""), el(" ")]), None);
    }

    #[test]
    fn first_non_empty_text() {
        assert_eq!(first_text(&[el(" "), el(" A ")]).as_deref(), Some("A"));
    }

    #[test]
    fn swallow_keeps_values_and_drops_errors() {
        assert_eq!(swallow("f", "u", Ok::<_, SessionError>(3)), Some(3));
        assert_eq!(
            swallow::<i32>("f", "u", Err(SessionError::Browser("boom".into()))),
            None
        );
    }
}
