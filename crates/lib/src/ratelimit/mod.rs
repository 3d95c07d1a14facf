//! Sliding-window rate limiting per caller key.
//!
//! Each key keeps the timestamps of its admitted requests inside the current
//! window. A request is admitted when fewer than `max` timestamps remain after
//! dropping the ones that fell out of the window. Rejected attempts are not
//! recorded, so a caller hammering the limiter does not extend its own lockout.
//!
//! All state sits behind one mutex. Call volume is one check per human
//! interaction, so a coarse lock is sufficient.

mod cleanup;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

pub use cleanup::{CleanupHandle, spawn_cleanup};

type Windows = HashMap<String, VecDeque<u64>>;

/// Per-key sliding-window admission control.
#[derive(Debug)]
pub struct RateLimiter {
    max: usize,
    window_ms: u64,
    clock: Arc<dyn Clock>,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Create a limiter admitting at most `max` requests per key within `window`.
    pub fn new(max: usize, window: Duration) -> Self {
        Self::with_clock(max, window, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from the given clock.
    pub fn with_clock(max: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max,
            window_ms: window.as_millis() as u64,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admission limit per window.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Decide whether a request from `key` may proceed, recording it if so.
    ///
    /// Timestamps at or before `now - window` are dropped first; `now` itself
    /// is inside the window.
    pub fn allow(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        let cutoff = now.saturating_sub(self.window_ms);

        let mut windows = self.lock();
        let hits = windows.entry(key.to_string()).or_default();
        prune(hits, cutoff);

        if hits.len() < self.max {
            hits.push_back(now);
            return true;
        }

        if hits.is_empty() {
            windows.remove(key);
        }
        tracing::debug!(key, limit = self.max, "Rate limit reached");
        false
    }

    /// Drop expired timestamps for every key and forget keys left empty.
    ///
    /// Returns the number of keys removed.
    pub fn cleanup(&self) -> usize {
        let cutoff = self.clock.now_millis().saturating_sub(self.window_ms);

        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, hits| {
            prune(hits, cutoff);
            !hits.is_empty()
        });
        before - windows.len()
    }

    /// Number of keys currently holding at least one timestamp entry.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Windows> {
        // Every mutation is a single push or pop, so a poisoned map is still consistent.
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn prune(hits: &mut VecDeque<u64>, cutoff: u64) {
    while matches!(hits.front(), Some(&t) if t <= cutoff) {
        hits.pop_front();
    }
}
