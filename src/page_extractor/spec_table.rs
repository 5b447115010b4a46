//! Specification-table parsing
//!
//! Detail pages list open-ended key/value rows (`Brand: Bosch`, `OEM Nömrə:
//! 55250-2B000`, ...). Every two-column row lands in the attribute map; a
//! key matching the OEM pattern additionally fills the dedicated OEM field.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use super::probes::swallow;
use crate::config::SelectorMap;
use crate::session::BrowserSession;

const CELL_SELECTOR: &str = "th, td";

/// What a specification table contributed to a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecTable {
    pub oem: Option<String>,
    pub attributes: BTreeMap<String, Option<String>>,
}

/// Strip surrounding whitespace and one trailing colon from a row label
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(':')
        .map_or(trimmed, str::trim_end)
        .to_string()
}

/// Fold raw table rows into a [`SpecTable`].
///
/// Rows without exactly two cells (headers, colspans) and rows with an
/// empty key are skipped. Empty values are kept as `None`.
#[must_use]
pub fn parse_rows(rows: &[Vec<String>], oem_key: &Regex) -> SpecTable {
    let mut table = SpecTable::default();
    for row in rows {
        let [key, value] = row.as_slice() else {
            continue;
        };
        let key = normalize_key(key);
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());

        if oem_key.is_match(&key) && value.is_some() {
            table.oem.clone_from(&value);
        }
        table.attributes.insert(key, value);
    }
    table
}

/// Read the details table, activating the description tab once if the
/// table has no rows yet.
pub(crate) async fn read<S: BrowserSession>(
    session: &S,
    selectors: &SelectorMap,
    oem_key: &Regex,
    url: &str,
) -> SpecTable {
    let mut rows = swallow(
        "specification table",
        url,
        session.query_rows(&selectors.details_table, CELL_SELECTOR).await,
    )
    .unwrap_or_default();

    if rows.is_empty() {
        debug!("No specification rows on {url}, activating description tab");
        if swallow(
            "description tab",
            url,
            session.force_click(&selectors.description_tab).await,
        )
        .is_some()
        {
            rows = swallow(
                "specification table",
                url,
                session.query_rows(&selectors.details_table, CELL_SELECTOR).await,
            )
            .unwrap_or_default();
        }
    }

    parse_rows(&rows, oem_key)
}
