//! Whole-store persistence.
//!
//! [`DocumentBackend`] loads and saves the complete [`Store`] as one JSON
//! document through a [`DocumentTransport`]. When a [`FieldCipher`] is
//! configured, sensitive fields are encrypted on a detached copy of the store
//! before writing and decrypted on the freshly parsed document before the
//! store is built, so the live store always holds plaintext.
//!
//! # Consistency
//!
//! `save` is a blind overwrite of the whole document. Two processes that
//! load, mutate and save concurrently will lose one side's changes; nothing
//! here detects that. Run a single writer per document.

mod config;
mod errors;
mod sealing;
mod transport;
pub mod transports;

use std::path::PathBuf;
use std::sync::Arc;

pub use config::BackendConfig;
pub use errors::PersistenceError;
pub use transport::DocumentTransport;
pub use transports::{FileTransport, GistTransport, MemoryTransport};

use crate::{
    Result,
    cipher::FieldCipher,
    clock::{Clock, SystemClock},
    store::{Document, Store},
};

/// Loads and saves a [`Store`] through a transport, optionally encrypting
/// sensitive fields.
#[derive(Debug, Clone)]
pub struct DocumentBackend {
    transport: Arc<dyn DocumentTransport>,
    cipher: Option<FieldCipher>,
    clock: Arc<dyn Clock>,
}

impl DocumentBackend {
    /// Plaintext backend over `transport`, using the system clock.
    pub fn new(transport: impl DocumentTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            cipher: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Backend over a remote gist described by `config`.
    pub fn gist(config: &BackendConfig) -> Result<Self> {
        Ok(Self::new(GistTransport::new(config)?))
    }

    /// Backend over a local JSON file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileTransport::new(path))
    }

    /// Encrypt sensitive fields with `cipher` on save and decrypt them on load.
    pub fn with_cipher(mut self, cipher: FieldCipher) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Clock handed to loaded stores.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Fetch, decrypt and migrate the stored document.
    ///
    /// A missing or blank document yields an empty store. A document holding
    /// encrypted values fails with
    /// [`CryptoError::KeyRequired`](crate::cipher::CryptoError::KeyRequired)
    /// when no cipher is configured rather than exposing ciphertext as data.
    pub async fn load(&self) -> Result<Store> {
        let raw = self.transport.fetch().await?;
        let mut document = match raw.as_deref().map(str::trim) {
            None | Some("") => {
                tracing::info!(transport = self.transport_name(), "No stored document, starting empty");
                Document::default()
            }
            Some(text) => serde_json::from_str::<Document>(text)
                .map_err(|e| PersistenceError::malformed(&e))?,
        };

        let sealed_records = sealing::unseal(&mut document, self.cipher.as_ref())?;
        if sealed_records > 0 {
            tracing::debug!(sealed_records, "Decrypted sensitive fields");
        }

        let store = Store::from_document(document, self.clock.clone());
        tracing::info!(
            transport = self.transport_name(),
            users = store.len(),
            encrypted = self.is_encrypted(),
            "Loaded store"
        );
        Ok(store)
    }

    /// Serialize and write the whole store.
    ///
    /// `store` is only read. Encryption happens on a detached copy, and a
    /// failed write leaves both the store and the remote document unchanged
    /// from the caller's point of view.
    pub async fn save(&self, store: &Store) -> Result<()> {
        let mut document = store.to_document();
        sealing::seal(&mut document, self.cipher.as_ref())?;
        let json = serde_json::to_string_pretty(&document)
            .map_err(|source| PersistenceError::Serialization { source })?;

        self.transport.store(json).await?;
        tracing::info!(
            transport = self.transport_name(),
            users = store.len(),
            encrypted = self.is_encrypted(),
            "Saved store"
        );
        Ok(())
    }

    /// Load and immediately save, rewriting every sensitive field with the
    /// configured cipher. Returns the number of records written.
    pub async fn reseal(&self) -> Result<usize> {
        let store = self.load().await?;
        self.save(&store).await?;
        Ok(store.len())
    }
}
