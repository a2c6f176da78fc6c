// Date index writers racing on a live Redis server.
// Needs SLOTWATCH_REDIS_URL; run with `--ignored`.

use slotwatch_core::clock::ManualClock;
use slotwatch_core::CalendarDate;
use slotwatch_engine::commands::index::DateIndexManager;
use slotwatch_store::kv::{KvStore, RedisStore};
use slotwatch_store::snapshot::keys::INDEX_KEY;
use std::sync::Arc;
use std::time::Duration;

fn d(s: &str) -> CalendarDate {
    s.parse().unwrap()
}

async fn live_store(test: &str) -> Option<RedisStore> {
    let url = match std::env::var("SLOTWATCH_REDIS_URL") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => {
            eprintln!("skipping {test}: SLOTWATCH_REDIS_URL not set");
            return None;
        }
    };
    let prefix = format!("slotwatch-test-{}-{test}", std::process::id());
    let store = RedisStore::open(&url, &prefix, Duration::from_secs(2)).ok()?;
    if store.get(INDEX_KEY).await.is_err() {
        eprintln!("skipping {test}: redis not reachable");
        return None;
    }
    Some(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires SLOTWATCH_REDIS_URL"]
async fn test_concurrent_records_on_redis_keep_every_date() {
    let Some(store) = live_store("index_race").await else {
        return;
    };
    let store = Arc::new(store);
    let clock = ManualClock::at_date(d("2026-01-10"));
    let start = d("2026-01-01");

    // Four writers need at most four rounds, within the attempt limit
    let mut handles = Vec::new();
    for i in 0..4u32 {
        let store = Arc::clone(&store);
        let clock = clock.clone();
        handles.push(tokio::spawn(async move {
            DateIndexManager::new(store.as_ref(), &clock)
                .record(start.plus_days(i))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().inserted);
    }

    let index = DateIndexManager::new(store.as_ref(), &clock)
        .load_raw()
        .await
        .unwrap();
    assert_eq!(
        index.ascending(),
        &[d("2026-01-01"), d("2026-01-02"), d("2026-01-03"), d("2026-01-04")]
    );

    // Leave nothing behind under the test prefix
    store.set(INDEX_KEY, b"[]", Some(Duration::from_secs(1))).await.unwrap();
}
