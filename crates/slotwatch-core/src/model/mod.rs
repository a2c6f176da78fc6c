//! Domain model: records, summaries, snapshots and calendar types.

pub mod date;
pub mod record;
pub mod snapshot;
pub mod summary;

pub use date::{CalendarDate, HistoryRange, Period};
pub use record::{CategoryType, RawRow, Record};
pub use snapshot::Snapshot;
pub use summary::{round1, Summary};
