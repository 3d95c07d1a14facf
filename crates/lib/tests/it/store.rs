use std::time::Duration;

use prefstore::{
    Error, Store,
    record::{DigestMode, ItemStatus, Region},
    store::{FriendOutcome, StoreError},
};

use crate::helpers::{populated_store, test_clock};

const DAY: u64 = 86_400;

#[test]
fn test_invite_flow_links_both_sides() {
    let mut store = Store::new(test_clock());
    let host_code = store.get_or_create("555000123456").invite_code().to_string();
    store.get_or_create("777000654321");

    let (friend, outcome) = store.accept_invite("777000654321", &host_code).unwrap();
    assert_eq!(friend, "555000123456");
    assert_eq!(outcome, FriendOutcome::Added);
    assert!(store.is_friend("555000123456", "777000654321"));

    let (_, outcome) = store.accept_invite("777000654321", &host_code).unwrap();
    assert_eq!(outcome, FriendOutcome::AlreadyFriends);
}

#[test]
fn test_invite_for_unknown_code() {
    let mut store = Store::new(test_clock());
    store.get_or_create("555000123456");
    let err = store.accept_invite("555000123456", "nope").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "store");
    assert!(matches!(
        err,
        Error::Store(StoreError::InviteCodeNotFound { .. })
    ));
}

#[test]
fn test_friend_sharing_requires_both_sides() {
    let mut store = populated_store(test_clock());
    let item = "evt-1";

    store
        .get_or_create("200000222222")
        .set_item_status(item, ItemStatus::Interested)
        .unwrap();

    let interested = store.friends_interested_in("100000111111", item);
    assert_eq!(interested, vec![("200000222222".to_string(), ItemStatus::Interested)]);

    // Alice sees Bob only while Bob shares.
    store.get_or_create("200000222222").set_share_events(false);
    assert!(store.friends_interested_in("100000111111", item).is_empty());

    // Bob sees Alice's registration while both share.
    store.get_or_create("200000222222").set_share_events(true);
    assert_eq!(
        store.friends_interested_in("200000222222", item),
        vec![("100000111111".to_string(), ItemStatus::Registered)]
    );
}

#[test]
fn test_broadcast_queries_skip_inactive_users() {
    let mut store = populated_store(test_clock());
    let de = Region::parse("DE").unwrap();

    assert_eq!(
        store.all_active_keys_with_subscriptions(),
        vec!["100000111111", "200000222222"]
    );
    assert_eq!(store.subscribers_of(&de), vec!["100000111111", "200000222222"]);

    store.get_or_create("200000222222").set_active(false);
    assert_eq!(store.subscribers_of(&de), vec!["100000111111"]);

    // Inactive records stay loadable and mutable.
    let record = store.get("200000222222").unwrap();
    record.set_digest(DigestMode::Daily, 20, 0).unwrap();
    assert_eq!(record.digest_mode(), DigestMode::Daily);
}

#[test]
fn test_weekly_rollover_over_several_weeks() {
    let clock = test_clock();
    let mut store = Store::new(clock.clone());

    for week in 0..3u64 {
        let record = store.get_or_create("42");
        for _ in 0..=week {
            record.record_item_viewed();
        }
        record.record_item_status(ItemStatus::Registered);
        clock.advance_secs(7 * DAY);
        assert_eq!(store.rollover_weekly_stats(), 1);
    }

    let record = store.get_or_create("42");
    let history: Vec<_> = record.stats_history().keys().cloned().collect();
    assert_eq!(history, vec!["2024-W01", "2024-W02", "2024-W03"]);

    let totals = record.all_time_stats();
    assert_eq!(totals.items_viewed, 6);
    assert_eq!(totals.items_registered, 3);
    assert_eq!(totals.items_marked[&ItemStatus::Registered], 3);
    assert_eq!(totals.weeks_tracked, 4);
}

#[test]
fn test_prune_seen_ids_across_users() {
    let clock = test_clock();
    let mut store = Store::new(clock.clone());
    let start = store.clock().now_secs();

    store.get_or_create("a").mark_seen("evt-old", start);
    clock.advance_secs(10 * DAY);
    let later = store.clock().now_secs();
    store.get_or_create("a").mark_seen("evt-new", later);
    store.get_or_create("b").mark_seen("evt-old", start);

    assert_eq!(store.prune_seen_ids(Duration::from_secs(5 * DAY)), 2);
    assert!(store.get_or_create("a").is_seen("evt-new"));
    assert!(!store.get_or_create("b").is_seen("evt-old"));
}

#[test]
fn test_validation_errors_leave_record_unchanged() {
    let mut store = Store::new(test_clock());
    let record = store.get_or_create("k");
    record.set_days_ahead_filter(14).unwrap();
    let before = record.clone();

    let err: Error = record.set_days_ahead_filter(10_000).unwrap_err().into();
    assert!(err.is_validation_error());
    assert_eq!(err.module(), "record");
    assert!(record.toggle_reminder(2).is_err());
    assert!(record.set_subscriptions(&["de", "???"]).is_err());
    assert_eq!(*record, before);
}
