//! Engine-level commands shared by the CLI and the HTTP surface.

use slotwatch_core::{CalendarDate, HistoryRange, Period, Snapshot};
use slotwatch_store::errors::Result;

use super::capture::{run_capture, CaptureResult};
use super::compare::{compare, ComparisonResult};
use super::index::DateIndexManager;
use super::reader::{get_by_date, get_latest, get_range, RangeView};
use crate::context::EngineContext;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Fetch, classify and persist today's snapshot
    Capture,
    /// Read the snapshot for one date
    ShowDate { date: CalendarDate },
    /// Read the most recently captured snapshot
    ShowLatest,
    /// Index dates or a trailing window of summaries
    Range { range: HistoryRange },
    /// Period-over-period comparison
    Compare { period: Period },
    /// Visible index dates, newest first
    Dates,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    Captured(CaptureResult),
    Snapshot(Box<Snapshot>),
    Range(RangeView),
    Comparison(ComparisonResult),
    Dates(Vec<CalendarDate>),
}

/// Apply an engine command against the context's store and clock.
///
/// # Errors
///
/// Whatever the underlying command reports; see the `commands` modules.
pub async fn apply_engine_command(
    cmd: EngineCommand,
    ctx: &EngineContext,
) -> Result<EngineCommandResult> {
    let store = ctx.store.as_ref();
    let clock = ctx.clock.as_ref();
    match cmd {
        EngineCommand::Capture => {
            let result =
                run_capture(store, clock, ctx.source.as_ref(), ctx.classifier.as_ref()).await?;
            Ok(EngineCommandResult::Captured(result))
        }
        EngineCommand::ShowDate { date } => Ok(EngineCommandResult::Snapshot(Box::new(
            get_by_date(store, date).await?,
        ))),
        EngineCommand::ShowLatest => Ok(EngineCommandResult::Snapshot(Box::new(
            get_latest(store).await?,
        ))),
        EngineCommand::Range { range } => Ok(EngineCommandResult::Range(
            get_range(store, clock, range).await?,
        )),
        EngineCommand::Compare { period } => Ok(EngineCommandResult::Comparison(
            compare(store, clock, period).await?,
        )),
        EngineCommand::Dates => Ok(EngineCommandResult::Dates(
            DateIndexManager::new(store, clock).all_descending().await?,
        )),
    }
}
