//! Capture command

use slotwatch_engine::{apply_engine_command, EngineCommand, EngineCommandResult, EngineContext};

use super::{render, unexpected};

pub async fn execute(engine: &EngineContext) -> anyhow::Result<String> {
    match apply_engine_command(EngineCommand::Capture, engine).await? {
        result @ EngineCommandResult::Captured(_) => render(result),
        _ => unexpected("capture"),
    }
}
