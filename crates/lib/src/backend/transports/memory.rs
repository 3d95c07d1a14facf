//! In-process transport for tests and dry runs

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{Result, backend::DocumentTransport};

/// Holds the document in memory. Clones share the same slot, so a test can
/// keep a handle and inspect exactly what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    slot: Arc<Mutex<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    contents: Option<String>,
    writes: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let transport = Self::default();
        transport.lock().contents = Some(contents.into());
        transport
    }

    /// The document text as last written (or seeded).
    pub fn contents(&self) -> Option<String> {
        self.lock().contents.clone()
    }

    /// Number of completed `store` calls.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentTransport for MemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    async fn store(&self, contents: String) -> Result<()> {
        let mut slot = self.lock();
        slot.contents = Some(contents);
        slot.writes += 1;
        Ok(())
    }
}
