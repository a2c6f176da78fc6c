//! Error handling for slotwatch-store
//!
//! Wraps slotwatch-core ExError with store-specific helpers

use slotwatch_core::errors::{ExError, ExErrorKind};
use std::time::Duration;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a backend failure error
pub fn backend_error(op: &str, key: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message(format!("Store call failed: {}", reason))
}

/// Create a deadline error for a remote call
pub fn timeout_error(op: &str, key: &str, after: Duration) -> ExError {
    ExError::new(ExErrorKind::Timeout)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message(format!("Store call timed out after {}ms", after.as_millis()))
}

/// Create an error for a write rejected by an injected fault
pub fn injected_write_failure(op: &str, key: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message("Write rejected by store".to_string())
}

/// Create a connection setup error
pub fn connection_error(url_hint: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("open_store")
        .with_message(format!("Cannot open store at {}: {}", url_hint, reason))
}
