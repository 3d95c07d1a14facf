//! Selective encryption of a detached document.
//!
//! Sensitive fields are the free-text item notes and the invite code.
//! Everything else, including item statuses, is stored as-is. Sealed values
//! are bound to their user key and field, so they cannot be swapped between
//! records without failing to open.

use crate::{
    Result,
    cipher::{CryptoError, FieldCipher, escape_plain, is_sealed, unescape_plain},
    record::UserRecord,
    store::Document,
};

fn notes_context(user: &str) -> String {
    format!("{user}\0item_notes")
}

fn invite_context(user: &str) -> String {
    format!("{user}\0invite_code")
}

/// Prepare every sensitive field for writing, in place.
///
/// With a cipher the fields are encrypted. Without one, plaintext in the
/// reserved marker namespace is escaped so a later load reads it back as
/// plaintext.
pub(crate) fn seal(document: &mut Document, cipher: Option<&FieldCipher>) -> Result<()> {
    for (key, record) in document.0.iter_mut() {
        match cipher {
            Some(cipher) => {
                record.item_notes = cipher.encrypt_map(&record.item_notes, &notes_context(key))?;
                record.invite_code = cipher.encrypt_bound(&record.invite_code, &invite_context(key))?;
            }
            None => {
                for note in record.item_notes.values_mut() {
                    *note = escape_plain(note).into_owned();
                }
                record.invite_code = escape_plain(&record.invite_code).into_owned();
            }
        }
    }
    Ok(())
}

/// Restore every sensitive field to plaintext, in place.
///
/// Sealed values without a cipher fail with [`CryptoError::KeyRequired`].
/// Returns the number of records that held at least one sealed value.
pub(crate) fn unseal(document: &mut Document, cipher: Option<&FieldCipher>) -> Result<usize> {
    let sealed_records = document.0.values().filter(|r| has_sealed(r)).count();
    let Some(cipher) = cipher else {
        if sealed_records > 0 {
            return Err(CryptoError::KeyRequired.into());
        }
        for record in document.0.values_mut() {
            for note in record.item_notes.values_mut() {
                *note = unescape_plain(note).to_string();
            }
            record.invite_code = unescape_plain(&record.invite_code).to_string();
        }
        return Ok(0);
    };

    for (key, record) in document.0.iter_mut() {
        record.item_notes = cipher.decrypt_map(&record.item_notes, &notes_context(key))?;
        record.invite_code = cipher.decrypt_bound(&record.invite_code, &invite_context(key))?;
    }
    Ok(sealed_records)
}

fn has_sealed(record: &UserRecord) -> bool {
    is_sealed(&record.invite_code) || record.item_notes.values().any(|v| is_sealed(v))
}
