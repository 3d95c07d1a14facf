//!
//! Prefstore: a per-user preference store synchronized against a single remote JSON document.
//!
//! ## Core Concepts
//!
//! * **Records (`record::UserRecord`)**: Everything known about one user: region subscriptions,
//!   digest settings, per-item statuses and notes, reminders, friends and weekly statistics.
//! * **Store (`store::Store`)**: The in-memory map from user key to record. Every access runs
//!   the lazy migration so records written by older versions are upgraded on read.
//! * **Document backend (`backend::DocumentBackend`)**: Loads and saves the entire store as one
//!   JSON document through a pluggable `DocumentTransport` (a remote gist, a local file, memory).
//! * **Field cipher (`cipher::FieldCipher`)**: AES-256-GCM encryption of sensitive string fields
//!   (notes, invite codes) applied to a detached copy of the store before it is written.
//! * **Rate limiter (`ratelimit::RateLimiter`)**: Sliding-window admission control per caller key.

pub mod backend;
pub mod cipher;
pub mod clock;
pub mod constants;
pub mod ratelimit;
pub mod record;
pub mod store;

pub use backend::{BackendConfig, DocumentBackend, DocumentTransport};
pub use cipher::FieldCipher;
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use ratelimit::{RateLimiter, spawn_cleanup};
pub use record::UserRecord;
pub use store::{Document, Store};

/// Result type used throughout the Prefstore library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Prefstore library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured validation errors from the record module
    #[error(transparent)]
    Record(record::RecordError),

    /// Structured lookup and relationship errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured encryption errors from the cipher module
    #[error(transparent)]
    Crypto(cipher::CryptoError),

    /// Structured load/save errors from the backend module
    #[error(transparent)]
    Persistence(backend::PersistenceError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Record(_) => "record",
            Error::Store(_) => "store",
            Error::Crypto(_) => "cipher",
            Error::Persistence(_) => "backend",
        }
    }

    /// Check if this error is a rejected input that left all state untouched.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Record(_) => true,
            Error::Store(store_err) => store_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error came from loading or saving the document.
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }

    /// Check if this error is encryption-related.
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }

    /// Check if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Persistence(persistence_err) => persistence_err.is_transient(),
            _ => false,
        }
    }
}
