//! Weekly usage statistics and their archive

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

use super::{ItemStatus, UserRecord};

/// Counters for one week of activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyStats {
    pub items_viewed: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items_marked: BTreeMap<ItemStatus, u64>,
    pub items_registered: u64,
    /// Epoch seconds at which this week's counting began
    pub week_start: i64,
}

impl WeeklyStats {
    /// A zeroed week beginning at `start`.
    pub fn starting(start: i64) -> Self {
        Self {
            week_start: start,
            ..Default::default()
        }
    }

    /// Whether nothing was counted this week.
    pub fn is_empty(&self) -> bool {
        self.items_viewed == 0 && self.items_registered == 0 && self.items_marked.is_empty()
    }

    /// Add another week's counts into this one. The earlier start is kept.
    fn absorb(&mut self, other: &WeeklyStats) {
        self.items_viewed += other.items_viewed;
        self.items_registered += other.items_registered;
        for (status, count) in &other.items_marked {
            *self.items_marked.entry(*status).or_default() += count;
        }
        if self.week_start == 0 || (other.week_start != 0 && other.week_start < self.week_start) {
            self.week_start = other.week_start;
        }
    }
}

/// Counts summed across the archive and the live week.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsTotals {
    pub items_viewed: u64,
    pub items_marked: BTreeMap<ItemStatus, u64>,
    pub items_registered: u64,
    /// Archived weeks plus the current one
    pub weeks_tracked: usize,
}

/// ISO-8601 week key ("2024-W01") for an epoch-seconds timestamp, in UTC.
pub fn week_key(timestamp: i64) -> String {
    let date = DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH);
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

impl UserRecord {
    pub fn weekly_stats(&self) -> &WeeklyStats {
        &self.weekly_stats
    }

    pub fn stats_history(&self) -> &BTreeMap<String, WeeklyStats> {
        &self.stats_history
    }

    /// Count one item view in the current week.
    pub fn record_item_viewed(&mut self) {
        self.weekly_stats.items_viewed += 1;
    }

    /// Count one status change in the current week.
    ///
    /// Marking an item registered also bumps the registered counter.
    pub fn record_item_status(&mut self, status: ItemStatus) {
        *self.weekly_stats.items_marked.entry(status).or_default() += 1;
        if status == ItemStatus::Registered {
            self.weekly_stats.items_registered += 1;
        }
    }

    /// Move the current week into the archive and start a new one at `now`.
    ///
    /// The snapshot is filed under the ISO week of its `week_start`. If that
    /// week already has a snapshot the counts are added to it, so repeated
    /// archiving within one week never drops counts.
    pub fn archive_current_week(&mut self, now: i64) -> String {
        let finished = std::mem::replace(&mut self.weekly_stats, WeeklyStats::starting(now));
        let key = week_key(finished.week_start);
        match self.stats_history.get_mut(&key) {
            Some(existing) => existing.absorb(&finished),
            None => {
                self.stats_history.insert(key.clone(), finished);
            }
        }
        key
    }

    /// Whether the live week began in an earlier ISO week than `now`.
    pub fn week_is_stale(&self, now: i64) -> bool {
        week_key(self.weekly_stats.week_start) != week_key(now)
    }

    /// Sum the archive and the live week without modifying either.
    pub fn all_time_stats(&self) -> StatsTotals {
        let mut total = WeeklyStats::default();
        for week in self.stats_history.values() {
            total.absorb(week);
        }
        total.absorb(&self.weekly_stats);

        StatsTotals {
            items_viewed: total.items_viewed,
            items_marked: total.items_marked,
            items_registered: total.items_registered,
            weeks_tracked: self.stats_history.len() + 1,
        }
    }
}
