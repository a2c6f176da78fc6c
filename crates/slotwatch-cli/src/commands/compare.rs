//! Compare command

use clap::Args;
use slotwatch_core::Period;
use slotwatch_engine::{apply_engine_command, EngineCommand, EngineCommandResult, EngineContext};

use super::{render, unexpected};

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// day, week or month
    #[arg(long, default_value = "day")]
    pub period: Period,
}

pub async fn execute(args: CompareArgs, engine: &EngineContext) -> anyhow::Result<String> {
    let cmd = EngineCommand::Compare {
        period: args.period,
    };
    match apply_engine_command(cmd, engine).await? {
        result @ EngineCommandResult::Comparison(_) => render(result),
        _ => unexpected("compare"),
    }
}
