#![allow(clippy::unwrap_used, clippy::expect_used)]

// Lifecycle logging emitted by engine commands

use slotwatch_core::clock::ManualClock;
use slotwatch_core::logging_facility::test_capture::init_test_capture;
use slotwatch_core::{CalendarDate, Period};
use slotwatch_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use slotwatch_engine::commands::capture::capture;
use slotwatch_engine::commands::compare::compare;
use slotwatch_engine::commands::reader::get_by_date;
use slotwatch_store::kv::MemoryStore;
use std::sync::Arc;

fn d(s: &str) -> CalendarDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_capture_emits_single_start_and_end() {
    let capture_log = init_test_capture();
    let clock = ManualClock::at_date(d("2031-05-17"));
    let store = MemoryStore::new(Arc::new(clock.clone()));

    capture(&store, &clock, Vec::new(), Vec::new()).await.unwrap();

    let ends = capture_log.events_where("capture", "date", "2031-05-17");
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].event.as_deref(), Some(EVENT_END));
    assert!(ends[0].field("duration_ms").is_some());
    assert!(
        capture_log.count_events(|e| e.op.as_deref() == Some("capture")
            && e.event.as_deref() == Some(EVENT_START))
            >= 1
    );
}

#[tokio::test]
async fn test_not_found_emits_error_event_with_code() {
    let capture_log = init_test_capture();
    let clock = ManualClock::at_date(d("2031-06-01"));
    let store = MemoryStore::new(Arc::new(clock.clone()));

    get_by_date(&store, d("2031-06-01")).await.unwrap_err();

    let errors: Vec<_> = capture_log
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("get_by_date")
                && e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.field("err.message").is_some_and(|m| m.contains("2031-06-01"))
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err.code"), Some("ERR_NOT_FOUND"));
}

#[tokio::test]
async fn test_compare_logs_history_flag() {
    let capture_log = init_test_capture();
    let clock = ManualClock::at_date(d("2031-07-01"));
    let store = MemoryStore::new(Arc::new(clock.clone()));

    compare(&store, &clock, Period::Month).await.unwrap();

    assert!(!capture_log
        .events_where("compare", "has_history", "false")
        .is_empty());
}
