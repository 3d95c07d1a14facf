//! Lazy, per-field record migration
//!
//! Records are upgraded on every access instead of through a versioned
//! migration pass. Each step below looks at exactly one field (or one closely
//! related group), fills it in when it is missing or out of range, and reports
//! whether it changed anything. Steps run in order; later steps may read
//! fields that earlier steps have populated.
//!
//! Every step must be idempotent: running the whole list on an already
//! migrated record changes nothing.
//!
//! # Adding a New Field
//!
//! Store it as `Option<T>` (or with a zero value meaning "unset"), add a step
//! that fills it in, and append the step to [`STEPS`].

use super::{Region, UserRecord, WeeklyStats, invite_code_for};
use crate::constants::{
    ALLOWED_REMINDER_OFFSETS, DEFAULT_DIGEST_HOUR, DEFAULT_DIGEST_WEEKDAY, MAX_DAYS_AHEAD,
};

/// Inputs a migration step may depend on besides the record itself.
pub(crate) struct MigrationContext<'a> {
    pub key: &'a str,
    pub now: i64,
}

type Step = fn(&mut UserRecord, &MigrationContext<'_>) -> bool;

const STEPS: &[(&str, Step)] = &[
    ("active", migrate_active),
    ("subscriptions", migrate_subscriptions),
    ("digest_schedule", migrate_digest_schedule),
    ("reminder_offsets", migrate_reminder_offsets),
    ("notify_flags", migrate_notify_flags),
    ("hide_past_items", migrate_hide_past_items),
    ("days_ahead_filter", migrate_days_ahead_filter),
    ("item_notes", migrate_item_notes),
    ("weekly_stats", migrate_weekly_stats),
    ("created_at", migrate_created_at),
    ("invite_code", migrate_invite_code),
    ("friend_keys", migrate_friend_keys),
];

impl UserRecord {
    /// Bring this record up to the current schema. Returns `true` if any field changed.
    pub(crate) fn migrate(&mut self, ctx: &MigrationContext<'_>) -> bool {
        let mut changed = false;
        for (name, step) in STEPS {
            if step(self, ctx) {
                tracing::debug!(user = %ctx.key, step = name, "Migrated record field");
                changed = true;
            }
        }
        changed
    }
}

fn migrate_active(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    if record.active.is_some() {
        return false;
    }
    record.active = Some(true);
    true
}

/// Upper-case, deduplicate and drop codes that are no longer valid.
fn migrate_subscriptions(record: &mut UserRecord, ctx: &MigrationContext<'_>) -> bool {
    let needs_work = record
        .subscriptions
        .iter()
        .any(|code| Region::parse(code).map(|r| r.as_str() != code).unwrap_or(true));
    if !needs_work {
        return false;
    }

    let normalized = record
        .subscriptions
        .iter()
        .filter_map(|code| match Region::parse(code) {
            Ok(region) => Some(region.as_str().to_string()),
            Err(_) => {
                tracing::warn!(user = %ctx.key, code = %code, "Dropping invalid stored region");
                None
            }
        })
        .collect();
    record.subscriptions = normalized;
    true
}

fn migrate_digest_schedule(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    let mut changed = false;
    if !matches!(record.digest_hour, Some(h) if h <= 23) {
        record.digest_hour = Some(DEFAULT_DIGEST_HOUR);
        changed = true;
    }
    if !matches!(record.digest_weekday, Some(d) if d <= 6) {
        record.digest_weekday = Some(DEFAULT_DIGEST_WEEKDAY);
        changed = true;
    }
    changed
}

fn migrate_reminder_offsets(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    let before = record.reminder_offsets.len();
    record
        .reminder_offsets
        .retain(|d| ALLOWED_REMINDER_OFFSETS.contains(d));
    record.reminder_offsets.len() != before
}

fn migrate_notify_flags(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    let mut changed = false;
    if record.notify_on_change.is_none() {
        record.notify_on_change = Some(true);
        changed = true;
    }
    if record.notify_on_removal.is_none() {
        record.notify_on_removal = Some(true);
        changed = true;
    }
    changed
}

fn migrate_hide_past_items(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    if record.hide_past_items.is_some() {
        return false;
    }
    record.hide_past_items = Some(true);
    true
}

fn migrate_days_ahead_filter(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    if record.days_ahead_filter <= MAX_DAYS_AHEAD {
        return false;
    }
    record.days_ahead_filter = 0;
    true
}

fn migrate_item_notes(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    let before = record.item_notes.len();
    record.item_notes.retain(|_, note| !note.is_empty());
    record.item_notes.len() != before
}

/// The only step that reads the clock: a record without a week start begins counting now.
fn migrate_weekly_stats(record: &mut UserRecord, ctx: &MigrationContext<'_>) -> bool {
    if record.weekly_stats.week_start != 0 {
        return false;
    }
    if record.weekly_stats.is_empty() {
        record.weekly_stats = WeeklyStats::starting(ctx.now);
    } else {
        record.weekly_stats.week_start = ctx.now;
    }
    true
}

/// Earliest evidence of the user: the first seen item or the current week start.
fn migrate_created_at(record: &mut UserRecord, _: &MigrationContext<'_>) -> bool {
    if record.created_at != 0 {
        return false;
    }
    let first_seen = record.seen_ids.values().copied().filter(|t| *t > 0).min();
    record.created_at = match first_seen {
        Some(t) => t.min(record.weekly_stats.week_start),
        None => record.weekly_stats.week_start,
    };
    record.created_at != 0
}

fn migrate_invite_code(record: &mut UserRecord, ctx: &MigrationContext<'_>) -> bool {
    if !record.invite_code.is_empty() {
        return false;
    }
    record.invite_code = invite_code_for(ctx.key);
    !record.invite_code.is_empty()
}

fn migrate_friend_keys(record: &mut UserRecord, ctx: &MigrationContext<'_>) -> bool {
    record.friend_keys.remove(ctx.key)
}
