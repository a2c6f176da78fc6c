//! Canonical logging macros
//!
//! Callers must depend on `slotwatch-core-types` since the expanded macros
//! reference its schema constants.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use slotwatch_core::log_op_start;
/// log_op_start!("capture");
/// log_op_start!("compare", period = "week");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use slotwatch_core::log_op_end;
/// log_op_end!("capture", duration_ms = 42);
/// log_op_end!("capture", duration_ms = 42, row_count = 118);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into [`ExError`](crate::errors::ExError);
/// the error is borrowed-by-clone so the caller can still return it.
///
/// # Example
///
/// ```
/// # use slotwatch_core::log_op_error;
/// # use slotwatch_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::NotFound).with_entity_id("2026-01-10");
/// log_op_error!("get_by_date", err.clone(), duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = slotwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($field)*
        );
    }};
}
