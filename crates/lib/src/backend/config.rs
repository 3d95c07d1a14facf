//! Remote document configuration

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use super::PersistenceError;
use crate::constants::{DEFAULT_API_BASE, DEFAULT_DOCUMENT_FILE, DEFAULT_TIMEOUT_SECS};

/// Where the remote document lives and how to reach it.
///
/// The access token is held in zeroizing memory and never printed by `Debug`.
#[derive(Clone)]
pub struct BackendConfig {
    /// Identifier of the remote document (gist ID).
    pub document_id: String,
    /// Name of the file inside the document holding the store.
    pub file_name: String,
    /// Base URL of the document API, without a trailing slash.
    pub api_base: String,
    /// Bound applied to every remote call.
    pub timeout: Duration,
    token: Zeroizing<String>,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("document_id", &self.document_id)
            .field("file_name", &self.file_name)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BackendConfig {
    pub fn new(document_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            file_name: DEFAULT_DOCUMENT_FILE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: Zeroizing::new(token.into()),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Reject configurations that cannot address a document.
    pub fn validate(&self) -> Result<(), PersistenceError> {
        let invalid = |reason: &str| {
            Err(PersistenceError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.document_id.trim().is_empty() {
            return invalid("document id is empty");
        }
        if self.document_id.contains('/') {
            return invalid("document id must not contain '/'");
        }
        if self.file_name.trim().is_empty() {
            return invalid("file name is empty");
        }
        if self.timeout.is_zero() {
            return invalid("timeout must be positive");
        }
        Ok(())
    }
}
