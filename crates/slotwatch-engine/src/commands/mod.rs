//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Each public command emits `log_op_start!` at entry and exactly one of
//! `log_op_end!` / `log_op_error!` on exit.

pub mod capture;
pub mod compare;
pub mod engine_command;
pub mod index;
pub mod reader;

/// Milliseconds since `start`, for `duration_ms` fields
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
