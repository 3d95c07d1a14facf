use std::sync::Arc;
use std::time::Duration;

use prefstore::{
    RateLimiter, spawn_cleanup,
    constants::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW_SECS},
};

use crate::helpers::test_clock;

fn default_limiter() -> (RateLimiter, Arc<prefstore::FixedClock>) {
    let clock = test_clock();
    let limiter = RateLimiter::with_clock(
        DEFAULT_RATE_LIMIT,
        Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
        clock.clone(),
    );
    (limiter, clock)
}

#[test]
fn test_burst_then_recover_after_window() {
    let (limiter, clock) = default_limiter();

    for _ in 0..DEFAULT_RATE_LIMIT {
        assert!(limiter.allow("user-1"));
    }
    assert!(!limiter.allow("user-1"));

    clock.advance_secs(DEFAULT_RATE_WINDOW_SECS - 1);
    assert!(!limiter.allow("user-1"));

    clock.advance_secs(1);
    assert!(limiter.allow("user-1"));
}

#[test]
fn test_keys_do_not_share_budget() {
    let (limiter, _) = default_limiter();
    for _ in 0..DEFAULT_RATE_LIMIT {
        assert!(limiter.allow("noisy"));
    }
    assert!(!limiter.allow("noisy"));
    assert!(limiter.allow("quiet"));
}

#[test]
fn test_concurrent_callers_never_exceed_limit() {
    let (limiter, _) = default_limiter();
    let limiter = Arc::new(limiter);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || (0..5).filter(|_| limiter.allow("shared")).count())
        })
        .collect();
    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(admitted, DEFAULT_RATE_LIMIT);
}

#[tokio::test]
async fn test_background_cleanup_evicts_idle_keys() {
    let (limiter, clock) = default_limiter();
    let limiter = Arc::new(limiter);
    limiter.allow("a");
    limiter.allow("b");
    assert_eq!(limiter.tracked_keys(), 2);

    let handle = spawn_cleanup(limiter.clone(), Duration::from_millis(10));
    clock.advance_secs(DEFAULT_RATE_WINDOW_SECS + 1);
    tokio::time::timeout(Duration::from_secs(2), async {
        while limiter.tracked_keys() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    // Admission state is unaffected by eviction.
    assert!(limiter.allow("a"));
    handle.stop().await;
}
