//! Field-level encryption for data at rest
//!
//! Individual string values are sealed with AES-256-GCM under a single
//! pre-shared key. Each value gets a fresh random nonce; the stored form is
//! `enc:v1:` followed by base64 of `nonce || ciphertext || tag`.
//!
//! Empty strings are never encrypted, so an absent note or code stays empty
//! through a save/load cycle. Values without the `enc:v1:` marker are treated
//! as plaintext written before encryption was enabled and pass through
//! [`FieldCipher::decrypt`] unchanged.
//!
//! The whole `enc:` prefix is reserved. Plaintext that starts with it is
//! stored behind an `enc:raw:` escape (see [`escape_plain`]), so free text
//! typed by a user can never be mistaken for a sealed value.
//!
//! Sealed values can be bound to a context string passed as associated data.
//! A value sealed under one context fails to open under any other, which
//! stops ciphertext being moved between users or fields.

mod errors;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng, Payload},
};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

pub use errors::CryptoError;

use crate::Result;

/// Namespace reserved for stored-value markers.
pub const RESERVED_PREFIX: &str = "enc:";

/// Marker prefix identifying a sealed value.
pub const SEALED_PREFIX: &str = "enc:v1:";

/// Marker prefix wrapping plaintext that would otherwise look reserved.
pub const ESCAPED_PREFIX: &str = "enc:raw:";

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Authentication tag length appended by AES-GCM
const TAG_LENGTH: usize = 16;

/// Check whether a stored value carries the sealed marker.
pub fn is_sealed(value: &str) -> bool {
    value.starts_with(SEALED_PREFIX)
}

/// Prepare plaintext for storage without encryption.
///
/// Values in the reserved `enc:` namespace get an `enc:raw:` escape. All
/// other values, including the empty string, are returned unchanged.
pub fn escape_plain(value: &str) -> Cow<'_, str> {
    if value.starts_with(RESERVED_PREFIX) {
        Cow::Owned(format!("{ESCAPED_PREFIX}{value}"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Inverse of [`escape_plain`]. Unescaped values are returned as-is.
pub fn unescape_plain(stored: &str) -> &str {
    stored.strip_prefix(ESCAPED_PREFIX).unwrap_or(stored)
}

fn entry_context(context: &str, key: &str) -> String {
    format!("{context}\0{key}")
}

/// Symmetric cipher for individual stored string values.
#[derive(Clone)]
pub struct FieldCipher {
    key: Zeroizing<[u8; KEY_LENGTH]>,
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher").field("key", &"<redacted>").finish()
    }
}

impl FieldCipher {
    /// Create a cipher from raw key bytes.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self> {
        let key = key.as_ref();
        if key.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey {
                reason: format!("expected {KEY_LENGTH} bytes, got {}", key.len()),
            }
            .into());
        }
        let mut bytes = Zeroizing::new([0u8; KEY_LENGTH]);
        bytes.copy_from_slice(key);
        Ok(Self { key: bytes })
    }

    /// Create a cipher from a configured secret.
    ///
    /// A secret that is base64 for exactly 32 bytes is used as the key itself.
    /// Anything else is hashed with SHA-256 to produce the key.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(CryptoError::InvalidKey {
                reason: "secret is empty".to_string(),
            }
            .into());
        }

        if let Ok(mut decoded) = Base64::decode_vec(secret) {
            let cipher = (decoded.len() == KEY_LENGTH).then(|| Self::new(&decoded));
            decoded.zeroize();
            if let Some(cipher) = cipher {
                return cipher;
            }
        }

        let mut digest = [0u8; KEY_LENGTH];
        digest.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        let cipher = Self::new(digest);
        digest.zeroize();
        cipher
    }

    fn aead(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| {
            CryptoError::InvalidKey {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Seal a single value. The empty string stays empty.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.encrypt_bound(plaintext, "")
    }

    /// Seal a single value bound to `context`.
    ///
    /// The result only opens through [`FieldCipher::decrypt_bound`] with the
    /// same context.
    pub fn encrypt_bound(&self, plaintext: &str, context: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let payload = Payload {
            msg: plaintext.as_bytes(),
            aad: context.as_bytes(),
        };
        let ciphertext = self
            .aead()?
            .encrypt(&nonce, payload)
            .map_err(|e| CryptoError::EncryptionFailed {
                reason: e.to_string(),
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(format!("{SEALED_PREFIX}{}", Base64::encode_string(&sealed)))
    }

    /// Open a single value previously produced by [`FieldCipher::encrypt`].
    ///
    /// Unmarked values are returned as-is and escaped plaintext is unescaped.
    /// A marked value that fails to authenticate is an error, never a
    /// best-effort string.
    pub fn decrypt(&self, stored: &str) -> Result<String> {
        self.decrypt_bound(stored, "")
    }

    /// Open a value sealed by [`FieldCipher::encrypt_bound`] under `context`.
    pub fn decrypt_bound(&self, stored: &str, context: &str) -> Result<String> {
        let Some(encoded) = stored.strip_prefix(SEALED_PREFIX) else {
            return Ok(unescape_plain(stored).to_string());
        };

        let sealed = Base64::decode_vec(encoded).map_err(|e| CryptoError::MalformedCiphertext {
            reason: format!("invalid base64: {e}"),
        })?;
        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::MalformedCiphertext {
                reason: format!("sealed value too short ({} bytes)", sealed.len()),
            }
            .into());
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let plaintext = self
            .aead()?
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: context.as_bytes(),
                },
            )
            .map_err(|_| CryptoError::DecryptionFailed {
                reason: "authentication failed (wrong key or corrupted value)".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            CryptoError::DecryptionFailed {
                reason: "decrypted value is not UTF-8".to_string(),
            }
            .into()
        })
    }

    /// Seal every value of a map, keeping keys. Fails without a partial result.
    ///
    /// Each value is bound to `context` and its own key.
    pub fn encrypt_map(
        &self,
        map: &BTreeMap<String, String>,
        context: &str,
    ) -> Result<BTreeMap<String, String>> {
        map.iter()
            .map(|(k, v)| Ok((k.clone(), self.encrypt_bound(v, &entry_context(context, k))?)))
            .collect()
    }

    /// Open every value of a map, keeping keys. Fails without a partial result.
    pub fn decrypt_map(
        &self,
        map: &BTreeMap<String, String>,
        context: &str,
    ) -> Result<BTreeMap<String, String>> {
        map.iter()
            .map(|(k, v)| Ok((k.clone(), self.decrypt_bound(v, &entry_context(context, k))?)))
            .collect()
    }
}
