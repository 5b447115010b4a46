mod common;

use common::{RecordingAssets, SHOP, fast_config, product_page, product_url};
use kodegen_tools_shopscrape::crawl_engine::FolderCounter;
use kodegen_tools_shopscrape::page_extractor::ProductExtractor;
use kodegen_tools_shopscrape::session::{ClickEffect, StaticDomSession};
use kodegen_tools_shopscrape::{ScrapeConfig, SelectorMap, SessionFactory, StaticDomFactory, StaticSite};
use std::sync::Arc;

async fn session_for(site: StaticSite) -> StaticDomSession {
    StaticDomFactory::new(site).open().await.unwrap()
}

fn extractor(config: ScrapeConfig, counter: Arc<FolderCounter>) -> ProductExtractor<RecordingAssets> {
    ProductExtractor::new(
        Arc::new(config),
        counter,
        Arc::new(RecordingAssets::new("/srv/output")),
    )
    .unwrap()
}

#[tokio::test]
async fn full_page_fills_every_field() {
    let url = product_url(7);
    let session = session_for(StaticSite::new().page(&url, product_page(7, "Brake Pad 7"))).await;
    let extractor = extractor(fast_config(1), Arc::new(FolderCounter::new()));

    let record = extractor.extract(&url, &session).await.unwrap();

    assert_eq!(record.external_id, "7");
    assert_eq!(record.title.as_deref(), Some("Brake Pad 7"));
    // Sale price wins over the struck-through regular price
    assert_eq!(record.price.as_deref(), Some("95 ₼"));
    assert_eq!(record.description.as_deref(), Some("Fits most sedans."));
    assert_eq!(record.sku.as_deref(), Some("SKU-7"));
    assert_eq!(record.categories, vec!["Brakes", "Front axle"]);
    assert_eq!(record.tags, vec!["ceramic"]);
    assert_eq!(record.oem.as_deref(), Some("55250-7"));
    assert_eq!(record.attributes.get("Brand"), Some(&Some("Bosch".to_string())));
    assert_eq!(record.attributes.get("Weight"), Some(&None));
    assert_eq!(
        record.images,
        vec![
            "https://cdn.shop.test/7/main-full.jpg",
            "https://cdn.shop.test/7/back.png"
        ]
    );
    assert_eq!(record.url, url);
}

#[tokio::test]
async fn blank_page_still_yields_a_record() {
    let url = product_url(1);
    let session = session_for(StaticSite::new().page(&url, "<html><body></body></html>")).await;
    let counter = Arc::new(FolderCounter::new());
    let extractor = extractor(fast_config(1), Arc::clone(&counter));

    let record = extractor.extract(&url, &session).await.unwrap();

    assert_eq!(record.external_id, "gen_1");
    assert_eq!(counter.current(), 1);
    assert!(record.title.is_none());
    assert!(record.price.is_none());
    assert!(record.tags.is_empty());
    assert!(record.categories.is_empty());
    assert!(record.attributes.is_empty());
    assert!(record.images.is_empty());
}

#[tokio::test]
async fn navigation_failure_yields_nothing() {
    let session = session_for(StaticSite::new()).await;
    let extractor = extractor(fast_config(1), Arc::new(FolderCounter::new()));
    assert!(extractor.extract(&product_url(3), &session).await.is_none());
}

#[tokio::test]
async fn unrequested_fields_are_not_probed() {
    let url = product_url(2);
    let session = session_for(StaticSite::new().page(&url, product_page(2, "Pad"))).await;
    let config = ScrapeConfig::builder()
        .base_url(SHOP)
        .page_load_delay(0.0)
        .download_images(false)
        .fields(["title", "sku"])
        .build()
        .unwrap();

    let record = extractor(config, Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(record.title.as_deref(), Some("Pad"));
    assert_eq!(record.sku.as_deref(), Some("SKU-2"));
    assert!(record.price.is_none());
    assert!(record.images.is_empty());
    assert!(record.attributes.is_empty());
    assert!(record.oem.is_none());
}

#[tokio::test]
async fn hidden_specification_tab_is_opened_once() {
    let url = product_url(4);
    let collapsed = r##"<html><body><div id="product-4">
        <h1 class="product_title">Filter</h1>
        <ul><li class="description_tab"><a href="#tab-description">Description</a></li></ul>
    </div></body></html>"##;
    let expanded = r#"<html><body><div id="product-4">
        <h1 class="product_title">Filter</h1>
        <div id="tab-description"><table><tr><td>OEM code:</td><td>26300-35505</td></tr><tr><td>Height</td><td>85 mm</td></tr></table></div>
    </div></body></html>"#;
    let tab = SelectorMap::default().description_tab;
    let site = StaticSite::new()
        .page(&url, collapsed)
        .on_click(&url, tab.clone(), ClickEffect::replace_html(expanded));
    let factory = StaticDomFactory::new(site);
    let stats = factory.stats();
    let session = factory.open().await.unwrap();

    let record = extractor(fast_config(1), Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(record.oem.as_deref(), Some("26300-35505"));
    assert_eq!(record.attributes.get("Height"), Some(&Some("85 mm".to_string())));
    assert_eq!(stats.clicks_on(&tab), 1);
}

#[tokio::test]
async fn visible_specification_table_needs_no_tab_click() {
    let url = product_url(7);
    let tab = SelectorMap::default().description_tab;
    let factory = StaticDomFactory::new(StaticSite::new().page(&url, product_page(7, "Pad")));
    let stats = factory.stats();
    let session = factory.open().await.unwrap();

    let record = extractor(fast_config(1), Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(record.oem.as_deref(), Some("55250-7"));
    assert_eq!(stats.clicks_on(&tab), 0);
}

#[tokio::test]
async fn price_falls_back_to_configured_selector() {
    let url = product_url(6);
    let page = r#"<html><body><div id="product-6">
        <h1 class="product_title">Belt</h1>
        <p class="cost"><span class="cost-value">42 ₼</span></p>
    </div></body></html>"#;
    let session = session_for(StaticSite::new().page(&url, page)).await;
    let selectors = SelectorMap {
        price: ".cost-value".to_string(),
        ..SelectorMap::default()
    };
    let config = ScrapeConfig::builder()
        .base_url(SHOP)
        .page_load_delay(0.0)
        .download_images(false)
        .selectors(selectors)
        .build()
        .unwrap();

    let record = extractor(config, Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(record.price.as_deref(), Some("42 ₼"));
}

#[tokio::test]
async fn relative_gallery_sources_are_resolved_against_the_page() {
    let url = product_url(8);
    let page = r#"<html><body><div id="product-8">
        <h1 class="product_title">Mirror</h1>
        <div class="woocommerce-product-gallery">
          <div class="woocommerce-product-gallery__image"><img src="/wp-content/uploads/a.jpg"></div>
          <div class="woocommerce-product-gallery__image"><img src="//cdn.shop.test/b.jpg"></div>
          <div class="woocommerce-product-gallery__image"><img src="/wp-content/uploads/a-150x150.jpg"></div>
        </div>
    </div></body></html>"#;
    let session = session_for(StaticSite::new().page(&url, page)).await;

    let record = extractor(fast_config(1), Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(
        record.images,
        vec![
            "https://shop.test/wp-content/uploads/a.jpg",
            "https://cdn.shop.test/b.jpg"
        ]
    );
}

#[tokio::test]
async fn dedicated_oem_element_has_its_label_stripped() {
    let url = product_url(5);
    let page = r#"<html><body><div id="product-5">
        <h1 class="product_title">Hub</h1>
        <span class="oem-code">OEM Nömrə: 51750-2H000</span>
    </div></body></html>"#;
    let session = session_for(StaticSite::new().page(&url, page)).await;
    let selectors = SelectorMap {
        oem: Some(".oem-code".to_string()),
        ..SelectorMap::default()
    };
    let config = ScrapeConfig::builder()
        .base_url(SHOP)
        .page_load_delay(0.0)
        .download_images(false)
        .selectors(selectors)
        .build()
        .unwrap();

    let record = extractor(config, Arc::new(FolderCounter::new()))
        .extract(&url, &session)
        .await
        .unwrap();

    assert_eq!(record.oem.as_deref(), Some("51750-2H000"));
}

#[tokio::test]
async fn downloaded_images_land_in_a_numbered_title_folder() {
    let url = product_url(9);
    let session = session_for(StaticSite::new().page(&url, product_page(9, "Şaft ötürücü"))).await;
    let config = ScrapeConfig::builder()
        .base_url(SHOP)
        .page_load_delay(0.0)
        .download_images(true)
        .build()
        .unwrap();
    let assets = Arc::new(RecordingAssets::new("/srv/output"));
    let extractor = ProductExtractor::new(
        Arc::new(config),
        Arc::new(FolderCounter::new()),
        Arc::clone(&assets),
    )
    .unwrap();

    let record = extractor.extract(&url, &session).await.unwrap();

    let requests = assets.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1, "1.jpg");
    assert_eq!(requests[1].1, "2.png");
    assert!(requests.iter().all(|(_, _, folder)| folder.ends_with("images/1_SAFT_OTURUCU")));
    assert_eq!(
        record.images,
        vec![
            "/srv/output/images/1_SAFT_OTURUCU/1.jpg",
            "/srv/output/images/1_SAFT_OTURUCU/2.png"
        ]
    );
}

#[tokio::test]
async fn invalid_oem_pattern_is_a_config_error() {
    // Deserialized directly, so builder validation never sees the pattern
    let config: ScrapeConfig = serde_json::from_value(serde_json::json!({
        "base_url": SHOP,
        "oem_key_pattern": "(unclosed"
    }))
    .unwrap();
    let result = ProductExtractor::new(
        Arc::new(config),
        Arc::new(FolderCounter::new()),
        Arc::new(RecordingAssets::new("/srv/output")),
    );
    assert!(result.is_err());
}
