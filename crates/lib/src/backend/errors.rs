//! Error types for loading and saving the store document.
//!
//! None of these variants carry remote response bodies or document
//! contents; a malformed document is described by position and category only.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while moving the document to or from its transport.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_transient()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Document transport failed: {reason}")]
    Transport { reason: String },

    /// The remote call exceeded its configured bound.
    #[error("Document backend did not respond within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The remote answered with a non-success status.
    #[error("Document backend returned status {status}")]
    Status { status: u16 },

    /// The stored document or the remote envelope could not be parsed.
    #[error("Malformed document ({category} error at line {line}, column {column})")]
    MalformedDocument {
        category: &'static str,
        line: usize,
        column: usize,
    },

    /// The store could not be serialized for writing.
    #[error("Failed to serialize document: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Local file access failed.
    #[error("Document file I/O failed: {source}")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The backend configuration is unusable.
    #[error("Invalid backend configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl PersistenceError {
    /// Describe a parse failure without echoing any of the parsed text.
    pub fn malformed(err: &serde_json::Error) -> Self {
        let category = match err.classify() {
            serde_json::error::Category::Io => "io",
            serde_json::error::Category::Syntax => "syntax",
            serde_json::error::Category::Data => "data",
            serde_json::error::Category::Eof => "eof",
        };
        PersistenceError::MalformedDocument {
            category,
            line: err.line(),
            column: err.column(),
        }
    }

    /// Check if retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PersistenceError::Transport { .. } | PersistenceError::Timeout { .. } => true,
            PersistenceError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if the remote refused the configured credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PersistenceError::Status { status: 401 | 403 })
    }
}

impl From<PersistenceError> for crate::Error {
    fn from(err: PersistenceError) -> Self {
        crate::Error::Persistence(err)
    }
}
