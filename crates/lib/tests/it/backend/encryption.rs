use prefstore::{
    DocumentBackend, Error, FieldCipher,
    backend::MemoryTransport,
    cipher::{CryptoError, is_sealed},
};

use crate::helpers::{FILE_NAME, MockGist, populated_store, test_cipher, test_clock};

#[tokio::test]
async fn test_encrypted_save_seals_sensitive_fields_only() {
    let transport = MemoryTransport::new();
    let clock = test_clock();
    let backend = DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .with_clock(clock.clone());
    assert!(backend.is_encrypted());

    let store = populated_store(clock);
    let before = store.to_document();
    backend.save(&store).await.unwrap();

    // The live store keeps plaintext.
    assert_eq!(store.to_document(), before);

    let written = transport.contents().unwrap();
    assert!(!written.contains("bring the blue folder"));
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let alice = &value["100000111111"];
    assert!(is_sealed(alice["item_notes"]["evt-1"].as_str().unwrap()));
    assert!(is_sealed(alice["invite_code"].as_str().unwrap()));
    assert_eq!(alice["item_statuses"]["evt-1"], "registered");
    assert_eq!(alice["subscriptions"], serde_json::json!(["AT", "DE"]));
}

#[tokio::test]
async fn test_encrypted_round_trip_over_gist() {
    let mock = MockGist::default();
    let config = mock.serve().await;
    let clock = test_clock();
    let backend = DocumentBackend::gist(&config)
        .unwrap()
        .with_cipher(test_cipher())
        .with_clock(clock.clone());

    let store = populated_store(clock);
    backend.save(&store).await.unwrap();
    assert!(!mock.file(FILE_NAME).unwrap().contains("bring the blue folder"));

    let mut loaded = backend.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());
    assert_eq!(
        loaded.get("100000111111").unwrap().note("evt-1"),
        Some("bring the blue folder")
    );
    assert_eq!(loaded.find_by_invite_code("111111").unwrap(), "100000111111");
}

#[tokio::test]
async fn test_wrong_key_fails_load() {
    let transport = MemoryTransport::new();
    let clock = test_clock();
    DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .save(&populated_store(clock))
        .await
        .unwrap();

    let other = FieldCipher::from_secret("some-other-secret").unwrap();
    let err = DocumentBackend::new(transport)
        .with_cipher(other)
        .load()
        .await
        .unwrap_err();
    assert!(err.is_crypto_error());
    assert!(matches!(
        err,
        Error::Crypto(CryptoError::DecryptionFailed { .. })
    ));
}

#[tokio::test]
async fn test_sealed_document_without_key_is_refused() {
    let transport = MemoryTransport::new();
    DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .save(&populated_store(test_clock()))
        .await
        .unwrap();

    let err = DocumentBackend::new(transport).load().await.unwrap_err();
    assert!(matches!(err, Error::Crypto(CryptoError::KeyRequired)));
}

#[tokio::test]
async fn test_plaintext_document_loads_with_key_then_reseals() {
    let transport = MemoryTransport::new();
    let clock = test_clock();
    DocumentBackend::new(transport.clone())
        .save(&populated_store(clock.clone()))
        .await
        .unwrap();
    assert!(transport.contents().unwrap().contains("bring the blue folder"));

    let backend = DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .with_clock(clock);
    assert_eq!(backend.reseal().await.unwrap(), 3);
    assert!(!transport.contents().unwrap().contains("bring the blue folder"));

    let mut store = backend.load().await.unwrap();
    assert_eq!(
        store.get("100000111111").unwrap().note("evt-1"),
        Some("bring the blue folder")
    );
}

#[tokio::test]
async fn test_note_in_reserved_namespace_round_trips() {
    const NOTE: &str = "enc:v1:see you there";
    let clock = test_clock();
    let mut store = populated_store(clock.clone());
    store
        .get_or_create("200000222222")
        .set_note("evt-9", NOTE)
        .unwrap();

    // Plaintext document, no key.
    let transport = MemoryTransport::new();
    let plain = DocumentBackend::new(transport.clone()).with_clock(clock.clone());
    plain.save(&store).await.unwrap();
    let mut loaded = plain.load().await.unwrap();
    assert_eq!(loaded.get("200000222222").unwrap().note("evt-9"), Some(NOTE));
    assert_eq!(loaded.to_document(), store.to_document());

    // Turning encryption on later reads it back as plaintext and reseals it.
    let sealed = DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .with_clock(clock.clone());
    let mut loaded = sealed.load().await.unwrap();
    assert_eq!(loaded.get("200000222222").unwrap().note("evt-9"), Some(NOTE));
    sealed.reseal().await.unwrap();
    assert!(!transport.contents().unwrap().contains("see you there"));
    let mut loaded = sealed.load().await.unwrap();
    assert_eq!(loaded.get("200000222222").unwrap().note("evt-9"), Some(NOTE));

    // Encrypted from the start.
    let transport = MemoryTransport::new();
    let sealed = DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .with_clock(clock);
    sealed.save(&store).await.unwrap();
    let loaded = sealed.load().await.unwrap();
    assert_eq!(loaded.to_document(), store.to_document());
}

#[tokio::test]
async fn test_sealed_note_moved_between_users_fails_to_open() {
    let transport = MemoryTransport::new();
    let clock = test_clock();
    let backend = DocumentBackend::new(transport.clone())
        .with_cipher(test_cipher())
        .with_clock(clock.clone());
    let mut store = populated_store(clock);
    store
        .get_or_create("200000222222")
        .set_note("evt-1", "bob's note")
        .unwrap();
    backend.save(&store).await.unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&transport.contents().unwrap()).unwrap();
    let alice_note = value["100000111111"]["item_notes"]["evt-1"].clone();
    value["200000222222"]["item_notes"]["evt-1"] = alice_note;
    let tampered = MemoryTransport::with_contents(serde_json::to_string(&value).unwrap());

    let err = DocumentBackend::new(tampered)
        .with_cipher(test_cipher())
        .load()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Crypto(CryptoError::DecryptionFailed { .. })
    ));
}
