//! Error types for store lookups and relationships
use thiserror::Error;

/// Errors raised by [`Store`](super::Store) operations that need an existing record.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not found: {key}")]
    UserNotFound { key: String },

    #[error("No user has invite code {code:?}")]
    InviteCodeNotFound { code: String },

    #[error("Invite code {code:?} matches {} users", candidates.len())]
    AmbiguousInviteCode {
        code: String,
        candidates: Vec<String>,
    },

    #[error("User {key} cannot befriend themselves")]
    SelfFriend { key: String },
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UserNotFound { .. } | StoreError::InviteCodeNotFound { .. }
        )
    }

    /// Check if this error is a rejected request rather than a missing record.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, StoreError::SelfFriend { .. })
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
