//! Comparison resolver.
//!
//! ## Resolution (in order)
//!
//! 1. Latest date = newest visible index entry; empty index → no history
//! 2. Latest body must exist; a missing one is `DataInconsistency`
//! 3. Previous date = `latest - period` if indexed, otherwise the newest
//!    entry before `latest`, otherwise none
//! 4. A missing or corrupt previous body counts as no previous

use serde::Serialize;
use slotwatch_core::clock::Clock;
use slotwatch_core::compare::{compute_changes, resolve_previous, Resolution, SummaryChanges};
use slotwatch_core::errors::{ExError, ExErrorKind, HistoryError};
use slotwatch_core::{log_op_end, log_op_error, log_op_start};
use slotwatch_core::{CalendarDate, Period};
use slotwatch_store::errors::Result;
use slotwatch_store::kv::KvStore;
use slotwatch_store::snapshot::fetch_snapshot;

use super::elapsed_ms;
use super::index::DateIndexManager;
use super::reader::DatedSummary;

pub const NO_HISTORY_MESSAGE: &str =
    "No historical snapshots yet. Capture data to start tracking changes.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoHistory {
    pub has_history: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub has_history: bool,
    pub period: Period,
    pub target_date: CalendarDate,
    pub resolution: Resolution,
    pub current: DatedSummary,
    pub previous: Option<DatedSummary>,
    pub changes: Option<SummaryChanges>,
    /// Number of visible index entries
    pub available_dates: usize,
    pub oldest_date: Option<CalendarDate>,
    pub newest_date: Option<CalendarDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    NoHistory(NoHistory),
    Compared(Box<Comparison>),
}

impl ComparisonResult {
    pub fn has_history(&self) -> bool {
        matches!(self, ComparisonResult::Compared(_))
    }
}

/// Compare the latest snapshot with the baseline for `period`.
///
/// # Errors
///
/// - `DataInconsistency`: the newest indexed date has no body
/// - `CorruptData`: the index or the latest body failed validation
/// - `Persistence` / `Timeout`: a store read failed
pub async fn compare(
    store: &dyn KvStore,
    clock: &dyn Clock,
    period: Period,
) -> Result<ComparisonResult> {
    log_op_start!("compare", period = period.as_str());
    let start = std::time::Instant::now();

    let result = compare_impl(store, clock, period).await.map_err(|e| {
        log_op_error!(
            "compare",
            e.clone(),
            duration_ms = elapsed_ms(start),
            period = period.as_str()
        );
        e
    })?;

    log_op_end!(
        "compare",
        duration_ms = elapsed_ms(start),
        has_history = result.has_history()
    );
    Ok(result)
}

async fn compare_impl(
    store: &dyn KvStore,
    clock: &dyn Clock,
    period: Period,
) -> Result<ComparisonResult> {
    let index = DateIndexManager::new(store, clock).load().await?;

    let Some(latest) = index.newest() else {
        return Ok(ComparisonResult::NoHistory(NoHistory {
            has_history: false,
            message: NO_HISTORY_MESSAGE.to_string(),
        }));
    };

    let current = fetch_snapshot(store, latest).await?.ok_or_else(|| {
        ExError::from(HistoryError::IndexDivergence {
            date: latest.to_string(),
        })
        .with_op("compare")
    })?;

    let baseline = resolve_previous(&index, latest, period);
    tracing::debug!(
        period = period.as_str(),
        latest = %latest,
        target = %baseline.target_date,
        resolution = baseline.resolution.as_str(),
        "resolved comparison baseline"
    );

    let previous = match baseline.previous_date {
        Some(date) => match fetch_snapshot(store, date).await {
            Ok(found) => found,
            Err(e) if e.kind() == ExErrorKind::CorruptData => {
                tracing::warn!(date = %date, error = %e, "corrupt previous snapshot ignored");
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    let changes = previous
        .as_ref()
        .map(|prev| compute_changes(&current.summary, &prev.summary));

    Ok(ComparisonResult::Compared(Box::new(Comparison {
        has_history: true,
        period,
        target_date: baseline.target_date,
        resolution: baseline.resolution,
        current: DatedSummary {
            date: current.date,
            summary: current.summary,
        },
        previous: previous.map(|prev| DatedSummary {
            date: prev.date,
            summary: prev.summary,
        }),
        changes,
        available_dates: index.len(),
        oldest_date: index.oldest(),
        newest_date: index.newest(),
    })))
}
