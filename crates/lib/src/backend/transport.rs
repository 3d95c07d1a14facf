//! Transport abstraction for the store document.
//!
//! A transport moves one opaque text blob to and from wherever the document
//! lives. It knows nothing about records or encryption; that is the job of
//! [`DocumentBackend`](super::DocumentBackend).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::Result;

/// Get/put access to a single remote document.
#[async_trait]
pub trait DocumentTransport: Send + Sync + Debug {
    /// Short identifier used in logs ("gist", "file", "memory").
    fn name(&self) -> &'static str;

    /// Fetch the current document text.
    ///
    /// Returns `None` when the document (or the file inside it) does not exist
    /// yet. That is a normal first-run condition, not an error.
    async fn fetch(&self) -> Result<Option<String>>;

    /// Replace the document text. This is a blind overwrite.
    async fn store(&self, contents: String) -> Result<()>;
}
