use kodegen_tools_shopscrape::ScrapeConfig;
use std::io::Write;
use std::time::Duration;

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_full_config_file() {
    let file = write_config(
        r#"{
            "base_url": "https://parts.example.az/shop/",
            "max_threads": 3,
            "timeout": 20,
            "headless": false,
            "page_load_delay": 1.5,
            "download_images": false,
            "fields": ["title", "price", "images"],
            "selectors": {
                "product_links": "a.product-link",
                "images": ".gallery img"
            },
            "login": {
                "enabled": true,
                "url": "https://parts.example.az/my-account/",
                "username": "dealer",
                "password": "secret"
            },
            "database": { "enabled": true, "url": "sqlite://out/p.db", "table_prefix": "az_" },
            "test_mode_limit": 10
        }"#,
    );

    let config = ScrapeConfig::from_file(file.path()).unwrap();

    assert_eq!(config.max_threads(), 3);
    assert_eq!(config.timeout(), Duration::from_secs(20));
    assert!(!config.headless());
    assert_eq!(config.page_load_delay(), Duration::from_millis(1500));
    assert!(config.wants("price"));
    assert!(!config.wants("sku"));
    assert_eq!(config.selectors().product_links, "a.product-link");
    assert_eq!(config.selectors().gallery_images, ".gallery img");
    // Unset selectors keep their defaults
    assert_eq!(config.selectors().title, "h1.product_title");
    assert!(config.login().enabled);
    assert_eq!(config.login().selectors.username, "#username");
    assert_eq!(config.database().table_prefix, "az_");
    assert_eq!(config.test_mode_limit(), Some(10));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ScrapeConfig::from_file(dir.path().join("nope.json")).is_err());
}

#[test]
fn invalid_values_are_rejected_on_load() {
    for json in [
        r#"{"base_url": "not a url"}"#,
        r#"{"base_url": "https://a.test", "max_threads": 0}"#,
        r#"{"base_url": "https://a.test", "fields": ["colour"]}"#,
        r#"{"base_url": "https://a.test", "login": {"enabled": true, "url": "https://a.test/login"}}"#,
        r#"{"base_url": "https://a.test", "database": {"table_prefix": "x; DROP TABLE"}}"#,
        r#"{"base_url": "https://a.test", "oem_key_pattern": "(["}"#,
    ] {
        let file = write_config(json);
        assert!(ScrapeConfig::from_file(file.path()).is_err(), "accepted {json}");
    }
}

#[test]
fn db_override_flips_persistence() {
    let file = write_config(r#"{"base_url": "https://a.test"}"#);
    let mut config = ScrapeConfig::from_file(file.path()).unwrap();
    assert!(!config.database().enabled);
    config.override_database_enabled(true);
    assert!(config.database().enabled);
}
