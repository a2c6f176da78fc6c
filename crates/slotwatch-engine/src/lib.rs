//! Slotwatch Engine - Orchestration layer
//!
//! Coordinates the data source, the row classifier, core domain logic and the
//! snapshot store. Every public command owns its lifecycle logging; lower
//! layers emit only `tracing::debug!` / `warn!` detail.

pub mod commands;
pub mod context;
pub mod source;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use context::EngineContext;
pub use source::{DataSource, FetchOutcome, SheetsValuesSource, SourceData, StaticSource};
