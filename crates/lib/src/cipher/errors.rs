//! Error types for field encryption
use thiserror::Error;

/// Errors raised while encrypting or decrypting stored fields.
///
/// None of these carry plaintext or ciphertext contents.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid encryption key: {reason}")]
    InvalidKey { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Malformed ciphertext: {reason}")]
    MalformedCiphertext { reason: String },

    #[error("Document contains encrypted fields but no encryption key is configured")]
    KeyRequired,
}

impl CryptoError {
    /// Check if the failure points at the wrong key rather than damaged data.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidKey { .. }
                | CryptoError::KeyRequired
                | CryptoError::DecryptionFailed { .. }
        )
    }
}

impl From<CryptoError> for crate::Error {
    fn from(err: CryptoError) -> Self {
        crate::Error::Crypto(err)
    }
}
