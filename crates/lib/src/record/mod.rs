//! Per-user preference records
//!
//! A [`UserRecord`] holds everything the store knows about one user. Fields
//! that later versions added, or whose defaults are not the type's zero
//! value, are kept as `Option` on disk so that the lazy migration in
//! [`migration`] can tell "never set" from "explicitly false".
//!
//! Mutations validate their input first and return [`RecordError`] without
//! touching the record when it is rejected.

mod errors;
pub(crate) mod migration;
mod stats;
mod types;


use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use errors::RecordError;
pub use stats::{StatsTotals, WeeklyStats, week_key};
pub use types::{DigestMode, ItemStatus, Region};

use crate::constants::{
    ALL_REGIONS, ALLOWED_REMINDER_OFFSETS, DEFAULT_DIGEST_HOUR, DEFAULT_DIGEST_WEEKDAY,
    INVITE_CODE_LEN, MAX_DAYS_AHEAD, MAX_NOTE_CHARS,
};

/// Preferences, item state, friends and statistics for a single user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub(crate) subscriptions: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) active: Option<bool>,

    /// Item ID -> first-seen timestamp (epoch seconds)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) seen_ids: BTreeMap<String, i64>,

    pub(crate) digest_mode: DigestMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) digest_hour: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) digest_weekday: Option<u8>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) item_statuses: BTreeMap<String, ItemStatus>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) item_notes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub(crate) reminder_offsets: BTreeSet<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notify_on_change: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notify_on_removal: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) hide_past_items: Option<bool>,

    /// 0 means no limit
    pub(crate) days_ahead_filter: u32,

    pub(crate) weekly_stats: WeeklyStats,

    /// ISO week key ("2024-W01") -> archived week
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) stats_history: BTreeMap<String, WeeklyStats>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub(crate) friend_keys: BTreeSet<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) invite_code: String,

    pub(crate) share_events: bool,

    /// Epoch seconds; 0 until migrated
    pub(crate) created_at: i64,
}

/// Derive the invite code for a user key: its last six characters, or the
/// whole key when shorter.
pub fn invite_code_for(key: &str) -> String {
    let count = key.chars().count();
    key.chars()
        .skip(count.saturating_sub(INVITE_CODE_LEN))
        .collect()
}

/// Strip control characters from free text and trim it.
///
/// Newlines survive; tabs become spaces; everything else in the control
/// range is dropped.
pub(crate) fn sanitize_note(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn require_item_id(item_id: &str) -> Result<(), RecordError> {
    if item_id.trim().is_empty() {
        Err(RecordError::EmptyItemId)
    } else {
        Ok(())
    }
}

impl UserRecord {
    // === Subscriptions ===

    /// Subscribed region codes, normalized and sorted.
    pub fn subscriptions(&self) -> impl Iterator<Item = &str> {
        self.subscriptions.iter().map(String::as_str)
    }

    pub fn has_subscriptions(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Add a region. Returns `false` if it was already present.
    pub fn subscribe(&mut self, region: &Region) -> bool {
        self.subscriptions.insert(region.as_str().to_string())
    }

    /// Remove a region. Returns `false` if it was not present.
    pub fn unsubscribe(&mut self, region: &Region) -> bool {
        self.subscriptions.remove(region.as_str())
    }

    /// Replace all subscriptions at once from raw codes.
    ///
    /// Every code is validated before anything changes.
    pub fn set_subscriptions<S: AsRef<str>>(&mut self, codes: &[S]) -> Result<(), RecordError> {
        let regions = codes
            .iter()
            .map(|c| Region::parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.subscriptions = regions.into_iter().map(|r| r.as_str().to_string()).collect();
        Ok(())
    }

    /// Whether items for `region` reach this user, honoring the `ALL` wildcard.
    pub fn is_subscribed_to(&self, region: &Region) -> bool {
        self.subscriptions.contains(ALL_REGIONS) || self.subscriptions.contains(region.as_str())
    }

    // === Activity ===

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = Some(active);
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    // === Seen items ===

    /// Record that an item was delivered. Returns `true` the first time.
    ///
    /// The original first-seen timestamp is kept on repeat calls.
    pub fn mark_seen(&mut self, item_id: &str, now: i64) -> bool {
        if self.seen_ids.contains_key(item_id) {
            return false;
        }
        self.seen_ids.insert(item_id.to_string(), now);
        true
    }

    pub fn is_seen(&self, item_id: &str) -> bool {
        self.seen_ids.contains_key(item_id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// Forget items first seen before `cutoff` (epoch seconds). Returns how many were removed.
    pub fn prune_seen(&mut self, cutoff: i64) -> usize {
        let before = self.seen_ids.len();
        self.seen_ids.retain(|_, seen_at| *seen_at >= cutoff);
        before - self.seen_ids.len()
    }

    // === Digest ===

    pub fn digest_mode(&self) -> DigestMode {
        self.digest_mode
    }

    pub fn digest_hour(&self) -> u8 {
        self.digest_hour.unwrap_or(DEFAULT_DIGEST_HOUR)
    }

    /// 0 = Sunday through 6 = Saturday.
    pub fn digest_weekday(&self) -> u8 {
        self.digest_weekday.unwrap_or(DEFAULT_DIGEST_WEEKDAY)
    }

    /// Set the delivery mode and schedule together.
    ///
    /// Hour and weekday are validated and stored for every mode, but only
    /// consulted when the mode is not `Immediate`.
    pub fn set_digest(&mut self, mode: DigestMode, hour: u8, weekday: u8) -> Result<(), RecordError> {
        if hour > 23 {
            return Err(RecordError::InvalidDigestHour { hour });
        }
        if weekday > 6 {
            return Err(RecordError::InvalidDigestWeekday { weekday });
        }
        self.digest_mode = mode;
        self.digest_hour = Some(hour);
        self.digest_weekday = Some(weekday);
        Ok(())
    }

    // === Item statuses and notes ===

    pub fn item_status(&self, item_id: &str) -> Option<ItemStatus> {
        self.item_statuses.get(item_id).copied()
    }

    /// Set the status for an item. Returns the previous status.
    pub fn set_item_status(
        &mut self,
        item_id: &str,
        status: ItemStatus,
    ) -> Result<Option<ItemStatus>, RecordError> {
        require_item_id(item_id)?;
        Ok(self.item_statuses.insert(item_id.to_string(), status))
    }

    pub fn clear_item_status(&mut self, item_id: &str) -> Option<ItemStatus> {
        self.item_statuses.remove(item_id)
    }

    /// Item IDs carrying the given status, sorted.
    pub fn items_with_status(&self, status: ItemStatus) -> Vec<&str> {
        self.item_statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn note(&self, item_id: &str) -> Option<&str> {
        self.item_notes.get(item_id).map(String::as_str)
    }

    /// Attach free text to an item.
    ///
    /// Control characters are stripped first. A note that is empty after
    /// sanitizing removes any existing note.
    pub fn set_note(&mut self, item_id: &str, text: &str) -> Result<(), RecordError> {
        require_item_id(item_id)?;
        let clean = sanitize_note(text);
        let len = clean.chars().count();
        if len > MAX_NOTE_CHARS {
            return Err(RecordError::NoteTooLong {
                len,
                max: MAX_NOTE_CHARS,
            });
        }
        if clean.is_empty() {
            self.item_notes.remove(item_id);
        } else {
            self.item_notes.insert(item_id.to_string(), clean);
        }
        Ok(())
    }

    pub fn notes(&self) -> &BTreeMap<String, String> {
        &self.item_notes
    }

    // === Reminders ===

    pub fn reminder_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.reminder_offsets.iter().copied()
    }

    /// Flip a reminder offset on or off. Returns `true` if it is now enabled.
    pub fn toggle_reminder(&mut self, days: u32) -> Result<bool, RecordError> {
        if !ALLOWED_REMINDER_OFFSETS.contains(&days) {
            return Err(RecordError::InvalidReminderOffset {
                days,
                allowed: &ALLOWED_REMINDER_OFFSETS,
            });
        }
        if self.reminder_offsets.remove(&days) {
            Ok(false)
        } else {
            self.reminder_offsets.insert(days);
            Ok(true)
        }
    }

    // === Display and notification filters ===

    pub fn notify_on_change(&self) -> bool {
        self.notify_on_change.unwrap_or(true)
    }

    pub fn set_notify_on_change(&mut self, enabled: bool) {
        self.notify_on_change = Some(enabled);
    }

    pub fn notify_on_removal(&self) -> bool {
        self.notify_on_removal.unwrap_or(true)
    }

    pub fn set_notify_on_removal(&mut self, enabled: bool) {
        self.notify_on_removal = Some(enabled);
    }

    pub fn hide_past_items(&self) -> bool {
        self.hide_past_items.unwrap_or(true)
    }

    pub fn set_hide_past_items(&mut self, hide: bool) {
        self.hide_past_items = Some(hide);
    }

    pub fn days_ahead_filter(&self) -> u32 {
        self.days_ahead_filter
    }

    /// Only show items at most `days` ahead; 0 removes the limit.
    pub fn set_days_ahead_filter(&mut self, days: u32) -> Result<(), RecordError> {
        if days > MAX_DAYS_AHEAD {
            return Err(RecordError::InvalidDaysAhead {
                days,
                max: MAX_DAYS_AHEAD,
            });
        }
        self.days_ahead_filter = days;
        Ok(())
    }

    // === Sharing ===

    pub fn invite_code(&self) -> &str {
        &self.invite_code
    }

    pub fn shares_events(&self) -> bool {
        self.share_events
    }

    pub fn set_share_events(&mut self, share: bool) {
        self.share_events = share;
    }

    pub fn friend_keys(&self) -> impl Iterator<Item = &str> {
        self.friend_keys.iter().map(String::as_str)
    }

    pub fn friend_count(&self) -> usize {
        self.friend_keys.len()
    }

    /// Whether `other` is in this record's friend list.
    pub fn lists_friend(&self, other: &str) -> bool {
        self.friend_keys.contains(other)
    }
}
