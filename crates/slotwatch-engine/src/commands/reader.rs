//! Snapshot reader: point lookups and trailing-window summaries.

use futures::future::join_all;
use serde::Serialize;
use slotwatch_core::clock::Clock;
use slotwatch_core::errors::{ExError, ExErrorKind, HistoryError};
use slotwatch_core::{log_op_end, log_op_error, log_op_start};
use slotwatch_core::{CalendarDate, HistoryRange, Snapshot, Summary};
use slotwatch_store::errors::Result;
use slotwatch_store::kv::KvStore;
use slotwatch_store::snapshot::{fetch_latest_date, fetch_snapshot};

use super::elapsed_ms;
use super::index::DateIndexManager;

/// A summary paired with the date it was captured on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedSummary {
    pub date: CalendarDate,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllDates {
    pub dates: Vec<CalendarDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummaries {
    pub range: HistoryRange,
    /// Indexed dates inside the window, ascending
    pub available_dates: Vec<CalendarDate>,
    /// Summaries for the dates whose bodies were found, ascending
    pub summaries: Vec<DatedSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RangeView {
    All(AllDates),
    Window(WindowSummaries),
}

/// Snapshot captured on `date`.
///
/// # Errors
///
/// - `NotFound`: no body for `date` (never written or expired)
/// - `CorruptData`: the stored body failed validation
/// - `Persistence` / `Timeout`: store read failed
pub async fn get_by_date(store: &dyn KvStore, date: CalendarDate) -> Result<Snapshot> {
    log_op_start!("get_by_date", date = %date);
    let start = std::time::Instant::now();

    let result = fetch_snapshot(store, date)
        .await
        .and_then(|found| {
            found.ok_or_else(|| {
                ExError::from(HistoryError::SnapshotMissing {
                    date: date.to_string(),
                })
                .with_op("get_by_date")
            })
        })
        .map_err(|e| {
            log_op_error!("get_by_date", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

    log_op_end!("get_by_date", duration_ms = elapsed_ms(start));
    Ok(result)
}

/// Index dates (`all`) or the summaries of a trailing window ending today.
///
/// Window dates are fetched concurrently. Dates whose bodies are missing
/// are skipped; corrupt bodies are skipped with a warning.
///
/// # Errors
///
/// - `CorruptData`: the stored index does not decode
/// - `Persistence` / `Timeout`: a store read failed
pub async fn get_range(
    store: &dyn KvStore,
    clock: &dyn Clock,
    range: HistoryRange,
) -> Result<RangeView> {
    log_op_start!("get_range", range = range.as_str());
    let start = std::time::Instant::now();

    let result = get_range_impl(store, clock, range).await.map_err(|e| {
        log_op_error!("get_range", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    let row_count = match &result {
        RangeView::All(all) => all.dates.len(),
        RangeView::Window(window) => window.summaries.len(),
    };
    log_op_end!(
        "get_range",
        duration_ms = elapsed_ms(start),
        row_count = row_count as u64
    );
    Ok(result)
}

async fn get_range_impl(
    store: &dyn KvStore,
    clock: &dyn Clock,
    range: HistoryRange,
) -> Result<RangeView> {
    let index = DateIndexManager::new(store, clock).load().await?;

    let Some(window) = range.window_days() else {
        return Ok(RangeView::All(AllDates {
            dates: index.ascending().to_vec(),
        }));
    };

    let available_dates: Vec<CalendarDate> = clock
        .today()
        .trailing(window)
        .into_iter()
        .filter(|date| index.exists(*date))
        .collect();

    let fetched = join_all(
        available_dates
            .iter()
            .map(|date| async move { (*date, fetch_snapshot(store, *date).await) }),
    )
    .await;

    let mut summaries = Vec::with_capacity(fetched.len());
    for (date, outcome) in fetched {
        match outcome {
            Ok(Some(snapshot)) => summaries.push(DatedSummary {
                date,
                summary: snapshot.summary,
            }),
            Ok(None) => {
                tracing::debug!(date = %date, "indexed snapshot missing, skipped");
            }
            Err(e) if e.kind() == ExErrorKind::CorruptData => {
                tracing::warn!(date = %date, error = %e, "corrupt snapshot skipped");
            }
            Err(e) => return Err(e),
        }
    }
    summaries.sort_by_key(|s| s.date);

    Ok(RangeView::Window(WindowSummaries {
        range,
        available_dates,
        summaries,
    }))
}

/// Snapshot named by the latest marker.
///
/// # Errors
///
/// - `NotFound`: nothing was ever captured, or the latest body expired
/// - `CorruptData`: marker or body failed validation
/// - `Persistence` / `Timeout`: store read failed
pub async fn get_latest(store: &dyn KvStore) -> Result<Snapshot> {
    let Some(date) = fetch_latest_date(store).await? else {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("get_latest")
            .with_message("No snapshot has been captured yet"));
    };
    get_by_date(store, date).await
}
