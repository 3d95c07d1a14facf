//! Constants used throughout the Prefstore library.
//!
//! Central definitions for limits, defaults and reserved values shared by the
//! record, store and backend modules.

/// Wildcard region: a subscription to every region.
pub const ALL_REGIONS: &str = "ALL";

/// Reminder offsets (days before an item) a user may enable.
pub const ALLOWED_REMINDER_OFFSETS: [u32; 4] = [1, 3, 7, 14];

/// Maximum length of a per-item note, in characters, after sanitizing.
pub const MAX_NOTE_CHARS: usize = 500;

/// Largest accepted "only show items this many days ahead" filter.
pub const MAX_DAYS_AHEAD: u32 = 365;

/// Digest hour used when a record has none or an out-of-range one.
pub const DEFAULT_DIGEST_HOUR: u8 = 9;

/// Digest weekday (0 = Sunday) used when a record has none or an out-of-range one.
pub const DEFAULT_DIGEST_WEEKDAY: u8 = 1;

/// Number of trailing key characters used as a record's invite code.
pub const INVITE_CODE_LEN: usize = 6;

/// File name inside the remote document holding the serialized store.
pub const DEFAULT_DOCUMENT_FILE: &str = "preferences.json";

/// Default base URL of the remote document API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default bound on a single remote call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default rate limit: admissions per window.
pub const DEFAULT_RATE_LIMIT: usize = 10;

/// Default rate-limit window, in seconds.
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;
