//! Slotwatch Core - domain kernel for availability snapshots
//!
//! This crate holds everything that does not touch the network or the store:
//! - the structured error facility and the logging facility
//! - the injectable clock
//! - records, summaries, snapshots and calendar types
//! - the bounded date index
//! - comparison baseline resolution and summary deltas
//! - row classification and the live-data cache

pub mod cache;
pub mod classify;
pub mod clock;
pub mod compare;
pub mod errors;
pub mod index;
pub mod logging_facility;
pub mod model;

pub use cache::{CachedValue, LiveCache};
pub use classify::{rows_from_values, ColumnClassifier, RowClassifier};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use compare::{compute_changes, resolve_previous, Resolution, ResolvedBaseline, SummaryChanges};
pub use errors::{ExError, ExErrorKind, HistoryError, Result};
pub use index::{DateIndex, MAX_INDEX_ENTRIES};
pub use model::{CalendarDate, CategoryType, HistoryRange, Period, RawRow, Record, Snapshot, Summary};
