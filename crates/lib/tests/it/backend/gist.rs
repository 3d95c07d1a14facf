use std::time::Duration;

use prefstore::{DocumentBackend, Error, backend::PersistenceError};

use crate::helpers::{FILE_NAME, MockGist, TOKEN, populated_store, test_clock};

#[tokio::test]
async fn test_gist_missing_file_loads_empty_store() {
    let mock = MockGist::with_file("other.txt", "unrelated");
    let config = mock.serve().await;
    let backend = DocumentBackend::gist(&config).unwrap();

    let store = backend.load().await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_gist_save_then_load_round_trip() {
    let mock = MockGist::default();
    let config = mock.serve().await;
    let clock = test_clock();
    let backend = DocumentBackend::gist(&config)
        .unwrap()
        .with_clock(clock.clone());

    let store = populated_store(clock);
    backend.save(&store).await.unwrap();
    assert!(mock.file(FILE_NAME).is_some());

    let loaded = backend.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());

    // Every request carried the bearer token.
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(
        requests
            .iter()
            .all(|(_, auth)| auth.as_deref() == Some(&format!("Bearer {TOKEN}")[..]))
    );
    assert_eq!(requests[0].0, "PATCH");
    assert_eq!(requests[1].0, "GET");
}

#[tokio::test]
async fn test_gist_error_status_is_typed_and_hides_body() {
    let mock = MockGist::default();
    let config = mock.serve().await;
    let backend = DocumentBackend::gist(&config).unwrap();
    mock.fail_with(503);

    let err = backend.load().await.unwrap_err();
    assert!(err.is_persistence_error());
    assert!(err.is_transient());
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::Status { status: 503 })
    ));
    assert!(!err.to_string().contains("SECRET-UPSTREAM-BODY"));
}

#[tokio::test]
async fn test_gist_failed_save_leaves_store_untouched() {
    let mock = MockGist::default();
    let config = mock.serve().await;
    let clock = test_clock();
    let backend = DocumentBackend::gist(&config).unwrap();
    let store = populated_store(clock);
    let before = store.to_document();

    mock.fail_with(401);
    let err = backend.save(&store).await.unwrap_err();
    assert!(!err.is_transient());
    match err {
        Error::Persistence(e) => assert!(e.is_unauthorized()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.to_document(), before);
    assert!(mock.file(FILE_NAME).is_none());
}

#[tokio::test]
async fn test_gist_timeout_is_transient() {
    let mock = MockGist::default();
    let config = mock
        .serve()
        .await
        .with_timeout(Duration::from_millis(100));
    let backend = DocumentBackend::gist(&config).unwrap();
    mock.delay(Duration::from_secs(2));

    let err = backend.load().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::Timeout { .. })
    ));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_gist_malformed_document() {
    let mock = MockGist::with_file(FILE_NAME, "{\"123\": {\"subscriptions\": 7}}");
    let config = mock.serve().await;
    let backend = DocumentBackend::gist(&config).unwrap();

    let err = backend.load().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::MalformedDocument { .. })
    ));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_gist_unknown_document_is_not_found_status() {
    let mock = MockGist::default();
    let mut config = mock.serve().await;
    config.document_id = "does-not-exist".to_string();
    let backend = DocumentBackend::gist(&config).unwrap();

    let err = backend.load().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError::Status { status: 404 })
    ));
}

#[tokio::test]
async fn test_gist_truncated_file_follows_raw_url_on_same_origin() {
    let mock = MockGist::default();
    let config = mock.serve().await;
    let clock = test_clock();
    let backend = DocumentBackend::gist(&config)
        .unwrap()
        .with_clock(clock.clone());
    let store = populated_store(clock);
    backend.save(&store).await.unwrap();

    mock.truncate_via(&config.api_base);
    let loaded = backend.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());

    let raw: Vec<_> = mock.requests().into_iter().filter(|(m, _)| m == "RAW").collect();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].1.as_deref(), Some(&format!("Bearer {TOKEN}")[..]));
}

#[tokio::test]
async fn test_gist_raw_url_on_other_origin_gets_no_token() {
    let clock = test_clock();
    let store = populated_store(clock.clone());
    let document = serde_json::to_string(&store.to_document()).unwrap();

    let raw_host = MockGist::with_file(FILE_NAME, &document);
    let raw_config = raw_host.serve().await;
    let mock = MockGist::with_file(FILE_NAME, &document);
    let config = mock.serve().await;
    mock.truncate_via(&raw_config.api_base);

    let backend = DocumentBackend::gist(&config).unwrap().with_clock(clock);
    let loaded = backend.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());

    let raw = raw_host.requests();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0], ("RAW".to_string(), None));
    // The API itself still saw the token.
    assert_eq!(
        mock.requests()[0].1.as_deref(),
        Some(&format!("Bearer {TOKEN}")[..])
    );
}
