//! Pure comparison logic: baseline resolution and summary deltas.
//!
//! Store access lives in the engine; everything here is deterministic over
//! an in-memory [`DateIndex`](crate::index::DateIndex) and two summaries.

pub mod deltas;
pub mod resolve;

pub use deltas::{compute_changes, error_rate_delta, SummaryChanges};
pub use resolve::{resolve_previous, Resolution, ResolvedBaseline};
