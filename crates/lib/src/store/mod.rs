//! The in-memory user store
//!
//! [`Store`] owns every [`UserRecord`] and is the only way to reach one.
//! Records are created on first access and migrated on every access, so a
//! caller never sees a record with unset defaults regardless of which version
//! wrote it.
//!
//! The store is not internally synchronized. It is meant to be mutated by one
//! request-processing task between a load and a save; callers that add more
//! concurrent mutators must wrap it in a lock.

mod errors;
mod friends;


use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use errors::StoreError;
pub use friends::FriendOutcome;

use crate::clock::{Clock, SystemClock};
use crate::record::{Region, UserRecord, migration::MigrationContext};

/// The persisted shape of a store: user key -> record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub BTreeMap<String, UserRecord>);

/// In-memory map from user key to record.
#[derive(Debug)]
pub struct Store {
    users: BTreeMap<String, UserRecord>,
    clock: Arc<dyn Clock>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Store {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: BTreeMap::new(),
            clock,
        }
    }

    /// Build a store from a loaded document, migrating every record.
    pub fn from_document(document: Document, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self {
            users: document.0,
            clock,
        };
        let now = store.clock.now_secs();
        let mut migrated = 0usize;
        for (key, record) in store.users.iter_mut() {
            if record.migrate(&MigrationContext { key, now }) {
                migrated += 1;
            }
        }
        if migrated > 0 {
            tracing::info!(migrated, total = store.users.len(), "Upgraded stored records");
        }
        store
    }

    /// Detached copy of all records, suitable for transforming and writing out.
    pub fn to_document(&self) -> Document {
        Document(self.users.clone())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.users.contains_key(key)
    }

    /// All user keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Read-only view of every record, sorted by key.
    pub fn records(&self) -> impl Iterator<Item = (&str, &UserRecord)> {
        self.users.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Fetch the record for `key`, creating it if needed. Never fails.
    pub fn get_or_create(&mut self, key: &str) -> &mut UserRecord {
        let now = self.clock.now_secs();
        let record = self.users.entry(key.to_string()).or_insert_with(|| {
            tracing::info!(user = %key, "Creating user record");
            UserRecord::default()
        });
        record.migrate(&MigrationContext { key, now });
        record
    }

    /// Fetch an existing record without creating one.
    pub fn get(&mut self, key: &str) -> Option<&mut UserRecord> {
        let now = self.clock.now_secs();
        let record = self.users.get_mut(key)?;
        record.migrate(&MigrationContext { key, now });
        Some(record)
    }

    /// Fetch an existing record or fail with [`StoreError::UserNotFound`].
    pub fn require(&mut self, key: &str) -> crate::Result<&mut UserRecord> {
        self.get(key).ok_or_else(|| {
            StoreError::UserNotFound {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Keys of active users with at least one subscription, sorted.
    pub fn all_active_keys_with_subscriptions(&self) -> Vec<String> {
        self.users
            .iter()
            .filter(|(_, r)| r.is_active() && r.has_subscriptions())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Keys of active users receiving items for `region` (directly or via `ALL`).
    pub fn subscribers_of(&self, region: &Region) -> Vec<String> {
        self.users
            .iter()
            .filter(|(_, r)| r.is_active() && r.is_subscribed_to(region))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Drop seen-item entries older than `max_age` from every record.
    ///
    /// Returns the total number of entries removed.
    pub fn prune_seen_ids(&mut self, max_age: Duration) -> usize {
        let now = self.clock.now_secs();
        // Ages beyond the representable range keep everything.
        let cutoff =
            i64::try_from(max_age.as_secs()).map_or(i64::MIN, |age| now.saturating_sub(age));
        let removed: usize = self
            .users
            .values_mut()
            .map(|record| record.prune_seen(cutoff))
            .sum();
        tracing::info!(removed, cutoff, "Pruned seen items");
        removed
    }

    /// Archive the live week of every record whose week began in an earlier
    /// ISO week. Returns the number of records archived.
    pub fn rollover_weekly_stats(&mut self) -> usize {
        let now = self.clock.now_secs();
        let mut archived = 0;
        for (key, record) in self.users.iter_mut() {
            if record.week_is_stale(now) {
                let week = record.archive_current_week(now);
                tracing::debug!(user = %key, week = %week, "Archived weekly stats");
                archived += 1;
            }
        }
        archived
    }

    /// Archive one user's live week now, regardless of its age.
    pub fn archive_current_week(&mut self, key: &str) -> crate::Result<String> {
        let now = self.clock.now_secs();
        Ok(self.require(key)?.archive_current_week(now))
    }
}
