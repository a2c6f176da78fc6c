// Test suite for snapshot persistence
// Tests body round trips, TTL expiry, corrupt values and index swaps

use chrono::TimeZone;
use slotwatch_core::clock::ManualClock;
use slotwatch_core::{CalendarDate, CategoryType, DateIndex, ExErrorKind, RawRow, Record, Snapshot};
use slotwatch_store::kv::{KvStore, MemoryStore};
use slotwatch_store::snapshot::keys::{snapshot_key, INDEX_KEY, LATEST_KEY};
use slotwatch_store::snapshot::{
    fetch_index, fetch_latest_date, fetch_snapshot, put_latest, put_snapshot, swap_index,
};
use std::sync::Arc;

fn d(s: &str) -> CalendarDate {
    s.parse().unwrap()
}

fn setup_test_env() -> (MemoryStore, ManualClock) {
    let clock = ManualClock::at_date(d("2026-01-10"));
    (MemoryStore::new(Arc::new(clock.clone())), clock)
}

fn create_test_snapshot() -> Snapshot {
    let at = chrono::Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();
    let records = vec![
        Record::unclassified(RawRow::new())
            .with_category(CategoryType::Hrt)
            .with_days_out(Some(3)),
        Record::unclassified(RawRow::new())
            .with_category(CategoryType::Provider)
            .with_days_out(Some(8))
            .with_error(true),
    ];
    Snapshot::build(records, vec!["Clinic".to_string()], at)
}

#[tokio::test]
async fn test_put_and_fetch_snapshot() {
    let (store, _clock) = setup_test_env();
    let snapshot = create_test_snapshot();

    put_snapshot(&store, &snapshot).await.unwrap();

    let restored = fetch_snapshot(&store, d("2026-01-10")).await.unwrap().unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(restored.summary.avg_days_out, Some(5.5));
}

#[tokio::test]
async fn test_snapshot_body_expires_after_retention() {
    let (store, clock) = setup_test_env();
    put_snapshot(&store, &create_test_snapshot()).await.unwrap();

    clock.advance(chrono::Duration::days(89));
    assert!(fetch_snapshot(&store, d("2026-01-10")).await.unwrap().is_some());

    clock.advance(chrono::Duration::days(1));
    assert!(fetch_snapshot(&store, d("2026-01-10")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_absent_snapshot_is_none() {
    let (store, _clock) = setup_test_env();
    assert!(fetch_snapshot(&store, d("2026-01-09")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_body_is_corrupt_data() {
    let (store, _clock) = setup_test_env();
    let key = snapshot_key(d("2026-01-10"));
    store.set(&key, b"{\"date\":", None).await.unwrap();

    let err = fetch_snapshot(&store, d("2026-01-10")).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CorruptData);
    assert_eq!(err.entity_id(), Some(key.as_str()));
}

#[tokio::test]
async fn test_body_stored_under_wrong_key_is_corrupt() {
    let (store, _clock) = setup_test_env();
    let bytes = create_test_snapshot().encode().unwrap();
    store
        .set(&snapshot_key(d("2026-01-09")), &bytes, None)
        .await
        .unwrap();

    let err = fetch_snapshot(&store, d("2026-01-09")).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CorruptData);
}

#[tokio::test]
async fn test_absent_index_is_empty() {
    let (store, _clock) = setup_test_env();
    let stored = fetch_index(&store).await.unwrap();
    assert!(stored.raw.is_none());
    assert!(stored.index.is_empty());
}

#[tokio::test]
async fn test_unparseable_index_is_corrupt_data() {
    let (store, _clock) = setup_test_env();
    store.set(INDEX_KEY, b"2026-01-10", None).await.unwrap();

    let err = fetch_index(&store).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CorruptData);
}

#[tokio::test]
async fn test_swap_index_detects_concurrent_change() {
    let (store, _clock) = setup_test_env();
    let first = DateIndex::from_dates([d("2026-01-09")]);
    assert!(swap_index(&store, None, &first).await.unwrap());

    let stored = fetch_index(&store).await.unwrap();
    assert_eq!(stored.raw.as_deref(), Some(br#"["2026-01-09"]"#.as_slice()));

    // Stale expectation loses.
    let second = DateIndex::from_dates([d("2026-01-09"), d("2026-01-10")]);
    assert!(!swap_index(&store, None, &second).await.unwrap());
    assert!(swap_index(&store, stored.raw.as_deref(), &second)
        .await
        .unwrap());

    let after = fetch_index(&store).await.unwrap();
    assert_eq!(after.index, second);
}

#[tokio::test]
async fn test_latest_marker_round_trip() {
    let (store, _clock) = setup_test_env();
    assert_eq!(fetch_latest_date(&store).await.unwrap(), None);

    put_latest(&store, d("2026-01-10")).await.unwrap();
    assert_eq!(
        fetch_latest_date(&store).await.unwrap(),
        Some(d("2026-01-10"))
    );
    assert_eq!(store.expires_at(LATEST_KEY).await, None);
}

#[tokio::test]
async fn test_latest_marker_accepts_bare_date() {
    let (store, _clock) = setup_test_env();
    store.set(LATEST_KEY, b"2026-01-08", None).await.unwrap();
    assert_eq!(
        fetch_latest_date(&store).await.unwrap(),
        Some(d("2026-01-08"))
    );

    store.set(LATEST_KEY, b"yesterday", None).await.unwrap();
    let err = fetch_latest_date(&store).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CorruptData);
}

#[tokio::test]
async fn test_write_failure_surfaces_persistence_error() {
    let (store, _clock) = setup_test_env();
    store.set_fail_writes(true);

    let err = put_snapshot(&store, &create_test_snapshot())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("put_snapshot"));
}
