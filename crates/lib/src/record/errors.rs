//! Validation errors for record mutations
use thiserror::Error;

/// Rejected input to a [`UserRecord`](super::UserRecord) mutation.
///
/// A mutation that returns one of these has left the record untouched.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid region code: {value:?}")]
    InvalidRegion { value: String },

    #[error("Invalid item status: {value:?} (expected interested, registered, maybe or skip)")]
    InvalidStatus { value: String },

    #[error("Invalid digest mode: {value:?} (expected immediate, daily or weekly)")]
    InvalidDigestMode { value: String },

    #[error("Invalid digest hour {hour} (expected 0-23)")]
    InvalidDigestHour { hour: u8 },

    #[error("Invalid digest weekday {weekday} (expected 0-6)")]
    InvalidDigestWeekday { weekday: u8 },

    #[error("Invalid reminder offset {days} (allowed: {allowed:?})")]
    InvalidReminderOffset { days: u32, allowed: &'static [u32] },

    #[error("Note too long: {len} characters (max {max})")]
    NoteTooLong { len: usize, max: usize },

    #[error("Invalid days-ahead filter {days} (max {max})")]
    InvalidDaysAhead { days: u32, max: u32 },

    #[error("Item ID must not be empty")]
    EmptyItemId,
}

impl From<RecordError> for crate::Error {
    fn from(err: RecordError) -> Self {
        crate::Error::Record(err)
    }
}
