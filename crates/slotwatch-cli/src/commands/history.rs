//! Read commands: show, latest, range, dates

use clap::Args;
use slotwatch_core::{CalendarDate, HistoryRange};
use slotwatch_engine::{apply_engine_command, EngineCommand, EngineCommandResult, EngineContext};

use super::{render, unexpected};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Capture date, YYYY-MM-DD
    #[arg(long)]
    pub date: CalendarDate,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// week, month or all
    #[arg(long, default_value = "week")]
    pub range: HistoryRange,
}

pub async fn execute_show(args: ShowArgs, engine: &EngineContext) -> anyhow::Result<String> {
    let cmd = EngineCommand::ShowDate { date: args.date };
    match apply_engine_command(cmd, engine).await? {
        result @ EngineCommandResult::Snapshot(_) => render(result),
        _ => unexpected("show"),
    }
}

pub async fn execute_latest(engine: &EngineContext) -> anyhow::Result<String> {
    match apply_engine_command(EngineCommand::ShowLatest, engine).await? {
        result @ EngineCommandResult::Snapshot(_) => render(result),
        _ => unexpected("latest"),
    }
}

pub async fn execute_range(args: RangeArgs, engine: &EngineContext) -> anyhow::Result<String> {
    let cmd = EngineCommand::Range { range: args.range };
    match apply_engine_command(cmd, engine).await? {
        result @ EngineCommandResult::Range(_) => render(result),
        _ => unexpected("range"),
    }
}

pub async fn execute_dates(engine: &EngineContext) -> anyhow::Result<String> {
    match apply_engine_command(EngineCommand::Dates, engine).await? {
        result @ EngineCommandResult::Dates(_) => render(result),
        _ => unexpected("dates"),
    }
}
