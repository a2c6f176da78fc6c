//! Command implementations. Each delegates to `apply_engine_command` and
//! returns pretty-printed JSON for stdout.

pub mod capture;
pub mod compare;
pub mod history;

use anyhow::bail;
use serde::Serialize;
use slotwatch_core::clock::SystemClock;
use slotwatch_core::errors::{ExError, HistoryError};
use slotwatch_engine::{EngineCommandResult, EngineContext};
use slotwatch_server::state::{build_source, open_store};
use slotwatch_server::ServerConfig;
use slotwatch_store::kv::{MemoryStore, SharedStore};
use std::sync::Arc;

/// Engine context from the server configuration.
///
/// `memory` swaps the configured store for an in-process one.
pub fn engine_context(memory: bool) -> anyhow::Result<EngineContext> {
    let config = ServerConfig::load()?;
    let store: SharedStore = if memory {
        Arc::new(MemoryStore::default())
    } else {
        open_store(&config)?.ok_or_else(|| {
            ExError::from(HistoryError::StoreUnconfigured)
                .with_message("Set SLOTWATCH_REDIS_URL or pass --memory")
        })?
    };
    Ok(EngineContext::new(
        store,
        Arc::new(SystemClock),
        build_source(&config),
        Arc::new(config.columns.clone()),
    ))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub(crate) fn render(result: EngineCommandResult) -> anyhow::Result<String> {
    match result {
        EngineCommandResult::Captured(r) => to_json(&r),
        EngineCommandResult::Snapshot(s) => to_json(&s),
        EngineCommandResult::Range(r) => to_json(&r),
        EngineCommandResult::Comparison(c) => to_json(&c),
        EngineCommandResult::Dates(d) => to_json(&d),
    }
}

/// Guard for results that do not match the issued command
pub(crate) fn unexpected(cmd: &str) -> anyhow::Result<String> {
    bail!("engine returned an unexpected result for {cmd}")
}
