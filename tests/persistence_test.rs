use kodegen_tools_shopscrape::{DatabaseConfig, PersistenceGateway, ProductRecord};
use tempfile::TempDir;

async fn gateway(dir: &TempDir) -> PersistenceGateway {
    let config = DatabaseConfig {
        enabled: true,
        url: format!("sqlite://{}", dir.path().join("db/products.db").display()),
        table_prefix: "test_".to_string(),
        max_connections: 2,
    };
    PersistenceGateway::connect(&config).await.unwrap()
}

fn record(id: &str) -> ProductRecord {
    let mut record = ProductRecord::new(id, format!("https://shop.test/product/{id}/"));
    record.title = Some(format!("Pad {id}"));
    record.price = Some("95 ₼".to_string());
    record.sku = Some(format!("SKU-{id}"));
    record.tags = vec!["ceramic".to_string()];
    record.attributes.insert("Brand".to_string(), Some("Bosch".to_string()));
    record.attributes.insert("Weight".to_string(), None);
    record.images = vec!["/img/1.jpg".to_string(), "/img/2.jpg".to_string()];
    record.categories = vec!["Brakes".to_string(), "Front".to_string()];
    record
}

#[tokio::test]
async fn upsert_is_idempotent_and_replaces_children() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway(&dir).await;

    let first = gateway.upsert(&record("10")).await.unwrap().unwrap();

    let mut renamed = record("10");
    renamed.title = Some("Pad 10 v2".to_string());
    renamed.images = vec!["/img/3.jpg".to_string()];
    renamed.categories = vec!["Rear".to_string()];
    let second = gateway.upsert(&renamed).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.count_products().await.unwrap(), 1);
    assert_eq!(gateway.product_images("10").await.unwrap(), vec!["/img/3.jpg"]);
    assert_eq!(gateway.product_categories("10").await.unwrap(), vec!["Rear"]);
    let stored = gateway.find_product("10").await.unwrap().unwrap();
    assert_eq!(stored.title.as_deref(), Some("Pad 10 v2"));
}

#[tokio::test]
async fn stored_record_matches_the_scraped_one() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway(&dir).await;
    let original = record("11");

    gateway.upsert(&original).await.unwrap();
    let stored = gateway.find_product("11").await.unwrap().unwrap();

    assert_eq!(stored.title, original.title);
    assert_eq!(stored.attributes, original.attributes);
    assert_eq!(stored.tags, original.tags);
    assert_eq!(stored.images, original.images);
    assert_eq!(stored.categories, original.categories);
    assert_eq!(stored.scraped_at, original.scraped_at);
    assert!(gateway.find_product("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn categories_are_shared_between_products() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway(&dir).await;

    let saved = gateway.save_batch(&[record("1"), record("2"), record("3")]).await;

    assert_eq!(saved, 3);
    for id in ["1", "2", "3"] {
        assert_eq!(gateway.product_categories(id).await.unwrap(), vec!["Brakes", "Front"]);
    }
}

#[tokio::test]
async fn empty_collections_round_trip() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway(&dir).await;
    let bare = ProductRecord::new("gen_1", "https://shop.test/product/x/");

    gateway.upsert(&bare).await.unwrap();
    let stored = gateway.find_product("gen_1").await.unwrap().unwrap();

    assert!(stored.title.is_none());
    assert!(stored.tags.is_empty());
    assert!(stored.attributes.is_empty());
    assert!(stored.images.is_empty());
}

#[tokio::test]
async fn clear_all_empties_every_table() {
    let dir = TempDir::new().unwrap();
    let gateway = gateway(&dir).await;
    gateway.save_batch(&[record("1"), record("2")]).await;

    assert!(gateway.clear_all().await);

    assert_eq!(gateway.count_products().await.unwrap(), 0);
    assert!(gateway.product_images("1").await.unwrap().is_empty());
    // Reusable after clearing
    assert_eq!(gateway.save_batch(&[record("1")]).await, 1);
}

#[tokio::test]
async fn disabled_config_gives_a_neutral_gateway() {
    let gateway = PersistenceGateway::connect(&DatabaseConfig::default()).await.unwrap();
    assert!(!gateway.is_enabled());
    assert_eq!(gateway.upsert(&record("1")).await.unwrap(), None);
    assert!(!gateway.clear_all().await);
}
