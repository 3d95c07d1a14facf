use prefstore::{DocumentBackend, backend::MemoryTransport};

use crate::helpers::{populated_store, test_clock};

#[tokio::test]
async fn test_memory_transport_shares_slot_between_clones() {
    let transport = MemoryTransport::new();
    let backend = DocumentBackend::new(transport.clone());
    assert_eq!(backend.transport_name(), "memory");

    backend.save(&populated_store(test_clock())).await.unwrap();
    backend.save(&populated_store(test_clock())).await.unwrap();

    assert_eq!(transport.writes(), 2);
    assert!(transport.contents().unwrap().contains("100000111111"));
}

#[tokio::test]
async fn test_second_get_or_create_after_reload_is_stable() {
    let transport = MemoryTransport::new();
    let clock = test_clock();
    let backend = DocumentBackend::new(transport.clone()).with_clock(clock.clone());
    backend.save(&populated_store(clock.clone())).await.unwrap();
    let written = transport.contents().unwrap();

    clock.advance_secs(90_000);
    let mut store = backend.load().await.unwrap();
    store.get_or_create("100000111111");
    store.get_or_create("100000111111");
    backend.save(&store).await.unwrap();

    assert_eq!(transport.contents().unwrap(), written);
}
