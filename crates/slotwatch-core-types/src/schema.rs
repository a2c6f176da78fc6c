//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the test capture layer, and anything that parses production JSON logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_ORIGIN: &str = "origin";

// Snapshot identifiers
pub const FIELD_DATE: &str = "date";
pub const FIELD_PERIOD: &str = "period";
pub const FIELD_RANGE: &str = "range";
pub const FIELD_KEY: &str = "key";

// Collection sizes
pub const FIELD_ROW_COUNT: &str = "row_count";
pub const FIELD_INDEX_LEN: &str = "index_len";
pub const FIELD_ATTEMPTS: &str = "attempts";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_error_fields_are_namespaced() {
        assert!(FIELD_ERR_KIND.starts_with("err."));
        assert!(FIELD_ERR_CODE.starts_with("err."));
    }
}
