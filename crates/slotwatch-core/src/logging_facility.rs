//! Structured logging facility for slotwatch
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use slotwatch_core::logging_facility::{init, Profile};
//!
//! // Initialize once at process startup
//! init(Profile::Development);
//! ```
//!
//! Every engine operation (capture, compare, range read) emits exactly one
//! `start` event and exactly one `end` or `end_error` event.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
