//! Paginated listing walk that collects product detail URLs

use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Duration;

use super::shared::StopFlag;
use crate::config::ScrapeConfig;
use crate::session::{BrowserSession, settle};
use crate::utils::{is_valid_url, resolve_href};

/// Walks listing pages via the "next page" control.
///
/// Any page-level failure ends the walk and keeps what was collected so
/// far. The stop flag and the optional cap are checked before every page
/// load, and the cap again right after each page is read.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    product_links: String,
    pagination_next: String,
    page_load_delay: Duration,
    stop: StopFlag,
}

impl LinkDiscoverer {
    #[must_use]
    pub fn new(config: &ScrapeConfig, stop: StopFlag) -> Self {
        Self {
            product_links: config.selectors().product_links.clone(),
            pagination_next: config.selectors().pagination_next.clone(),
            page_load_delay: config.page_load_delay(),
            stop,
        }
    }

    /// Deduplicated absolute product URLs in first-seen order, at most `cap`.
    pub async fn discover<S: BrowserSession>(
        &self,
        session: &S,
        start_url: &str,
        cap: Option<usize>,
    ) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut visited_pages: HashSet<String> = HashSet::new();
        let reached_cap = |count: usize| cap.is_some_and(|limit| count >= limit);

        let mut next_page = Some(start_url.to_string());
        while let Some(page_url) = next_page.take() {
            if self.stop.is_stopped() {
                info!("Stop requested, ending link discovery");
                break;
            }
            if reached_cap(links.len()) {
                break;
            }
            if !visited_pages.insert(page_url.clone()) {
                warn!("Pagination loops back to {page_url}, stopping");
                break;
            }

            if let Err(e) = session.navigate(&page_url).await {
                error!("Link collection error on {page_url}: {e}");
                break;
            }
            settle(self.page_load_delay).await;

            let anchors = match session.query(&self.product_links, &["href"]).await {
                Ok(anchors) => anchors,
                Err(e) => {
                    error!("Link collection error on {page_url}: {e}");
                    break;
                }
            };

            let mut on_page = 0usize;
            for href in anchors.iter().filter_map(|a| a.attr("href")) {
                match resolve_href(&page_url, href) {
                    Ok(url) if is_valid_url(&url) => {
                        on_page += 1;
                        if seen.insert(url.clone()) {
                            links.push(url);
                        }
                    }
                    Ok(url) => debug!("Skipping non-http product link {url}"),
                    Err(e) => debug!("Skipping product link: {e}"),
                }
            }
            info!("Found {on_page} products on page. Total: {}", links.len());

            if reached_cap(links.len()) {
                info!("Reached product limit, skipping remaining pages");
                break;
            }

            next_page = match session.query(&self.pagination_next, &["href"]).await {
                Ok(controls) => controls
                    .iter()
                    .filter_map(|c| c.attr("href"))
                    .find_map(|href| resolve_href(&page_url, href).ok()),
                Err(e) => {
                    warn!("Could not read pagination on {page_url}: {e}");
                    None
                }
            };
        }

        if let Some(limit) = cap {
            links.truncate(limit);
        }
        links
    }
}
