//! Snapshot writer.
//!
//! ## Write sequence
//!
//! 1. Build the snapshot (summary computed once, here)
//! 2. Write the body under `snapshot:<date>` with the retention TTL
//! 3. Add the date to the index (compare-and-swap)
//! 4. Point `snapshot:latest` at the date
//!
//! The three writes are not a transaction. A failure part way leaves the
//! earlier writes in place; readers tolerate an indexed date without a body.

use serde::Serialize;
use slotwatch_core::classify::RowClassifier;
use slotwatch_core::clock::Clock;
use slotwatch_core::{log_op_end, log_op_error, log_op_start};
use slotwatch_core::{CalendarDate, Record, Snapshot, Summary};
use slotwatch_store::errors::Result;
use slotwatch_store::kv::KvStore;
use slotwatch_store::snapshot::{put_latest, put_snapshot};

use super::elapsed_ms;
use super::index::DateIndexManager;
use crate::source::DataSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub date: CalendarDate,
    pub row_count: u64,
    pub summary: Summary,
}

/// Persist today's snapshot of `records`.
///
/// # Errors
///
/// - `Persistence` / `Timeout`: a store write failed; nothing is retried
/// - `RetryExhausted`: the index update kept losing races
/// - `CorruptData`: the stored index does not decode
pub async fn capture(
    store: &dyn KvStore,
    clock: &dyn Clock,
    records: Vec<Record>,
    headers: Vec<String>,
) -> Result<CaptureResult> {
    log_op_start!("capture", row_count = records.len() as u64);
    let start = std::time::Instant::now();

    let result = capture_impl(store, clock, records, headers)
        .await
        .map_err(|e| {
            log_op_error!("capture", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

    log_op_end!(
        "capture",
        duration_ms = elapsed_ms(start),
        date = %result.date,
        row_count = result.row_count
    );
    Ok(result)
}

async fn capture_impl(
    store: &dyn KvStore,
    clock: &dyn Clock,
    records: Vec<Record>,
    headers: Vec<String>,
) -> Result<CaptureResult> {
    let snapshot = Snapshot::build(records, headers, clock.now());
    let date = snapshot.date;

    put_snapshot(store, &snapshot).await?;

    let outcome = DateIndexManager::new(store, clock).record(date).await?;
    tracing::debug!(
        date = %date,
        inserted = outcome.inserted,
        attempts = outcome.attempts,
        index_len = outcome.len,
        "date index updated"
    );

    put_latest(store, date).await?;

    Ok(CaptureResult {
        date,
        row_count: snapshot.row_count,
        summary: snapshot.summary,
    })
}

/// Fetch from `source`, classify, then [`capture`].
///
/// # Errors
///
/// - `UpstreamFetch`: the source reported failure; nothing is written
/// - any error from [`capture`]
pub async fn run_capture(
    store: &dyn KvStore,
    clock: &dyn Clock,
    source: &dyn DataSource,
    classifier: &dyn RowClassifier,
) -> Result<CaptureResult> {
    log_op_start!("run_capture", source = source.source_tag());
    let start = std::time::Instant::now();

    let fetched = source.fetch_current().await.into_result().map_err(|e| {
        log_op_error!("run_capture", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    let records = classifier.classify(&fetched.headers, &fetched.rows);
    let result = capture(store, clock, records, fetched.headers)
        .await
        .map_err(|e| {
            log_op_error!("run_capture", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

    log_op_end!(
        "run_capture",
        duration_ms = elapsed_ms(start),
        date = %result.date
    );
    Ok(result)
}
