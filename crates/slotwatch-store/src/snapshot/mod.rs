//! Snapshot persistence layer.
//!
//! Maps the domain values onto store keys:
//! - `snapshot:<YYYY-MM-DD>` holds one encoded [`Snapshot`](slotwatch_core::Snapshot)
//!   and expires after [`SNAPSHOT_TTL_DAYS`](keys::SNAPSHOT_TTL_DAYS)
//! - `snapshot:dates` holds the date index as a JSON string array
//! - `snapshot:latest` holds the date of the most recent capture
//!
//! ## Non-Responsibilities
//!
//! - Index retry policy and orchestration (handled by `slotwatch-engine`)
//! - Summary computation (handled by `slotwatch-core`)

pub mod keys;
pub mod persist;
pub mod query;

pub use persist::{put_latest, put_snapshot, swap_index};
pub use query::{fetch_index, fetch_latest_date, fetch_snapshot, StoredIndex};
