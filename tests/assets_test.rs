use kodegen_tools_shopscrape::{AssetError, AssetResolver, HttpAssetResolver};
use std::path::Path;

#[tokio::test]
async fn streams_body_into_sub_folder() {
    let mut server = mockito::Server::new_async().await;
    let body: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    let mock = server
        .mock("GET", "/uploads/pad.webp")
        .with_status(200)
        .with_header("content-type", "image/webp")
        .with_body(body.clone())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resolver = HttpAssetResolver::new(dir.path()).unwrap();
    let url = format!("{}/uploads/pad.webp", server.url());

    let path = resolver
        .download(&url, "1.webp", Path::new("images/3_PAD"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(path.is_absolute());
    assert!(path.ends_with("images/3_PAD/1.webp"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert!(!path.with_file_name("1.webp.part").exists());
}

#[tokio::test]
async fn error_status_is_reported_and_nothing_is_written() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/missing.jpg")
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resolver = HttpAssetResolver::new(dir.path()).unwrap();
    let url = format!("{}/missing.jpg", server.url());

    let err = resolver
        .download(&url, "1.jpg", Path::new("images/1_X"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssetError::Status { status: 404, .. }));
    assert!(!dir.path().join("images/1_X/1.jpg").exists());
}

#[tokio::test]
async fn rejects_bad_targets_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = HttpAssetResolver::new(dir.path()).unwrap();

    let err = resolver
        .download("data:image/png;base64,AAAA", "1.png", Path::new("images"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::InvalidUrl(_)));

    let err = resolver
        .download("https://cdn.test/a.jpg", "../escape.jpg", Path::new("images"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::InvalidUrl(_)));
}

#[tokio::test]
async fn failed_save_leaves_no_partial_file() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/disc.jpg")
        .with_status(200)
        .with_body(vec![7u8; 4096])
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    // A non-empty directory squatting on the target name makes the final rename fail
    let squatter = dir.path().join("images/2_DISC/1.jpg");
    std::fs::create_dir_all(&squatter).unwrap();
    std::fs::write(squatter.join("keep"), b"x").unwrap();

    let resolver = HttpAssetResolver::new(dir.path()).unwrap();
    let url = format!("{}/disc.jpg", server.url());

    let err = resolver
        .download(&url, "1.jpg", Path::new("images/2_DISC"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssetError::Io(_)));
    assert!(!dir.path().join("images/2_DISC/1.jpg.part").exists());
    assert!(squatter.join("keep").exists());
}
