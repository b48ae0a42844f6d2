mod common;

use common::*;
use print_quote::*;

#[tokio::test]
async fn test_catalog_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let catalog = shop_catalog();
    catalog.save(&path).await.unwrap();
    let loaded = Catalog::load(&path).await.unwrap();

    assert_eq!(loaded, catalog);
}

#[tokio::test]
async fn test_request_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");

    let mut request = business_cards(750);
    request.product.color_back = Some(1);
    request.finishing_operation_ids = vec!["guillotine".to_string()];
    request.save(&path).await.unwrap();

    let loaded = QuoteRequest::load(&path).await.unwrap();
    assert_eq!(loaded, request);
}

#[tokio::test]
async fn test_result_save_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quote.json");

    let result = calculate(&business_cards(1000), &full_sheet_catalog(10)).unwrap();
    result.save(&path).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["options"].as_array().unwrap().len(), 2);
    assert_eq!(value["options"][0]["production_method"], "digital");
    assert_eq!(value["options"][0]["orientation"], "rotated");
    assert_eq!(value["recommendation"]["method"], "digital");
}

#[tokio::test]
async fn test_malformed_catalog_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, "{ \"paper_types\": [").await.unwrap();

    match Catalog::load(&path).await {
        Err(EngineError::Config(msg)) => assert!(msg.contains("Failed to parse catalog")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Catalog::load(dir.path().join("absent.json")).await;
    assert!(matches!(result, Err(EngineError::Io(_))));
}
