use std::fs;

use tempfile::TempDir;

use prefstore::{DocumentBackend, Error, backend::PersistenceError};

use crate::helpers::{populated_store, test_clock};

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let backend = DocumentBackend::file(dir.path().join("missing.json"));

    let store = backend.load().await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_load_blank_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.json");
    fs::write(&path, "  \n").unwrap();

    let store = DocumentBackend::file(&path).load().await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_file_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("preferences.json");
    let clock = test_clock();
    let backend = DocumentBackend::file(&path).with_clock(clock.clone());

    let store = populated_store(clock);
    backend.save(&store).await.unwrap();
    assert!(path.exists());
    assert!(!path.with_file_name("preferences.json.tmp").exists());

    let loaded = backend.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());
    assert_eq!(loaded.friends_of("100000111111"), vec!["200000222222"]);
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.json");
    fs::write(&path, "{invalid json").unwrap();

    let err = DocumentBackend::file(&path).load().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::MalformedDocument { .. })
    ));
}

#[tokio::test]
async fn test_saved_document_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    let clock = test_clock();
    let backend = DocumentBackend::file(&path);
    backend.save(&populated_store(clock)).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let users = value.as_object().unwrap();
    assert_eq!(users.len(), 3);

    let alice = &users["100000111111"];
    assert_eq!(alice["subscriptions"], serde_json::json!(["AT", "DE"]));
    assert_eq!(alice["item_statuses"]["evt-1"], "registered");
    assert_eq!(alice["item_notes"]["evt-1"], "bring the blue folder");
    assert_eq!(alice["invite_code"], "111111");

    // Unset optional data is absent, never null.
    assert!(users["300000333333"].get("item_notes").is_none());
    assert!(!value.to_string().contains("null"));
}

#[tokio::test]
async fn test_legacy_document_is_migrated_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{"42": {"subscriptions": ["de"], "digest_mode": "daily", "seen_ids": {"evt": 1700000000}}}"#,
    )
    .unwrap();

    let mut store = DocumentBackend::file(&path)
        .with_clock(test_clock())
        .load()
        .await
        .unwrap();
    let record = store.get("42").unwrap();
    assert!(record.is_active());
    assert!(record.hide_past_items());
    assert!(record.notify_on_change());
    assert_eq!(record.digest_hour(), 9);
    assert_eq!(record.created_at(), 1_700_000_000);
    assert_eq!(record.invite_code(), "42");
}
