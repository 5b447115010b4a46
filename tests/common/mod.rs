//! Shared fixtures: a small WooCommerce-shaped shop served by `StaticSite`

#![allow(dead_code)]

use kodegen_tools_shopscrape::{AssetError, AssetResolver, ScrapeConfig, StaticSite};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

pub const SHOP: &str = "https://shop.test/shop/";

/// Listing page URL: page 1 is the shop root, later pages are `/page/N/`
pub fn listing_url(page: usize) -> String {
    if page == 1 {
        SHOP.to_string()
    } else {
        format!("{SHOP}page/{page}/")
    }
}

pub fn product_url(id: usize) -> String {
    format!("https://shop.test/product/item-{id}/")
}

/// One listing page linking to `ids`, with a relative "next" link when
/// `next` is given.
pub fn listing_page(ids: &[usize], next: Option<usize>) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li class="product"><a class="woocommerce-LoopProduct-link" href="/product/item-{id}/">Item {id}</a></li>"#
            )
        })
        .collect();
    let pagination = next
        .map(|page| format!(r#"<a class="next page-numbers" href="/shop/page/{page}/">→</a>"#))
        .unwrap_or_default();
    format!(r#"<html><body><ul class="products">{items}</ul><nav>{pagination}</nav></body></html>"#)
}

/// Detail page with every field the default selectors know about
pub fn product_page(id: usize, title: &str) -> String {
    format!(
        r#"<html><body>
        <div id="product-{id}" class="product">
          <div class="woocommerce-product-gallery">
            <div class="woocommerce-product-gallery__image"><img src="https://cdn.shop.test/{id}/main.jpg" data-large_image="https://cdn.shop.test/{id}/main-full.jpg"></div>
            <div class="woocommerce-product-gallery__image"><img src="https://cdn.shop.test/{id}/side-100x100.jpg"></div>
            <div class="woocommerce-product-gallery__image"><img data-src="https://cdn.shop.test/{id}/back.png" src="data:image/gif;base64,R0lGOD"></div>
          </div>
          <div class="summary">
            <h1 class="product_title"> {title} </h1>
            <p class="price"><del><span class="amount">120 ₼</span></del> <ins><span class="amount">95 ₼</span></ins></p>
            <div class="woocommerce-product-details__short-description">Fits most sedans.</div>
            <div class="product_meta">
              <span class="sku">SKU-{id}</span>
              <span class="posted_in"><a href="/c/brakes">Brakes</a>, <a href="/c/front">Front axle</a></span>
              <span class="tagged_as"><a href="/t/ceramic">ceramic</a></span>
            </div>
          </div>
          <table class="shop_attributes">
            <tr><th>Brand:</th><td>Bosch</td></tr>
            <tr><th>OEM Nömrə</th><td>55250-{id}</td></tr>
            <tr><th>Weight</th><td> </td></tr>
          </table>
        </div>
        <section class="related"><img src="https://cdn.shop.test/related/other.jpg"></section>
        </body></html>"#
    )
}

/// `pages` listing pages of `per_page` products each, chained by "next"
/// links, plus every product's detail page.
pub fn catalog(pages: usize, per_page: usize) -> StaticSite {
    let mut site = StaticSite::new();
    for page in 1..=pages {
        let ids: Vec<usize> = ((page - 1) * per_page + 1..=page * per_page).collect();
        let next = (page < pages).then_some(page + 1);
        site = site.page(&listing_url(page), listing_page(&ids, next));
        for id in ids {
            site = site.page(&product_url(id), product_page(id, &format!("Brake Pad {id}")));
        }
    }
    site
}

/// Config tuned for in-process sessions: no settle delays, no image downloads
pub fn fast_config(threads: usize) -> ScrapeConfig {
    ScrapeConfig::builder()
        .base_url(SHOP)
        .max_threads(threads)
        .timeout_secs(1)
        .page_load_delay(0.0)
        .session_cooldown_ms(0)
        .download_images(false)
        .build()
        .expect("fixture config is valid")
}

/// Asset resolver that records requests and pretends every download worked
#[derive(Debug, Default)]
pub struct RecordingAssets {
    pub root: PathBuf,
    pub requests: Mutex<Vec<(String, String, PathBuf)>>,
}

impl RecordingAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, PathBuf)> {
        self.requests.lock().clone()
    }
}

impl AssetResolver for RecordingAssets {
    async fn download(&self, url: &str, file_name: &str, sub_folder: &Path) -> Result<PathBuf, AssetError> {
        self.requests
            .lock()
            .push((url.to_string(), file_name.to_string(), sub_folder.to_path_buf()));
        if url.contains("broken") {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: 404,
            });
        }
        Ok(self.root.join(sub_folder).join(file_name))
    }
}
