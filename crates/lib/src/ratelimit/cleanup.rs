//! Background eviction of idle rate-limit keys.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{Instrument, debug, info, info_span};

use super::RateLimiter;

/// Handle to a running cleanup task. Dropping it stops the task.
#[derive(Debug)]
pub struct CleanupHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CleanupHandle {
    /// Stop the task and wait for it to finish its current pass.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Run [`RateLimiter::cleanup`] every `period` on the current tokio runtime.
///
/// The first pass happens one full period after spawning.
pub fn spawn_cleanup(limiter: Arc<RateLimiter>, period: Duration) -> CleanupHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(
        async move {
            info!(period_secs = period.as_secs(), "Starting rate limiter cleanup");
            let mut ticker = interval(period);
            // Skip initial tick to avoid immediate execution
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = limiter.cleanup();
                        debug!(evicted, remaining = limiter.tracked_keys(), "Rate limiter cleanup pass");
                    }
                    _ = &mut shutdown_rx => {
                        info!("Rate limiter cleanup shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(info_span!("ratelimit_cleanup")),
    );

    CleanupHandle {
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}
