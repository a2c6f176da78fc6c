use slotwatch_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the structured error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that surfaces unchanged in HTTP
/// error bodies, CLI output and `err.code` log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,

    // Boundary checks (no side effects attempted)
    Configuration,
    Unauthorised,

    // Upstream collaborators
    UpstreamFetch,

    // Store
    NotFound,
    Persistence,
    /// Index references a date whose body cannot be retrieved
    DataInconsistency,
    /// A stored value failed to decode or validate
    CorruptData,
    /// Compare-and-swap on the date index lost too many races
    RetryExhausted,
    /// A remote call exceeded its deadline; safe to retry
    Timeout,

    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::UpstreamFetch => "ERR_UPSTREAM_FETCH",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::DataInconsistency => "ERR_DATA_INCONSISTENCY",
            ExErrorKind::CorruptData => "ERR_CORRUPT_DATA",
            ExErrorKind::RetryExhausted => "ERR_RETRY_EXHAUSTED",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the operator may simply run the same request again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Timeout | ExErrorKind::RetryExhausted | ExErrorKind::Persistence
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    hints: Vec<String>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            hints: Vec::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (a calendar date or a store key)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add operator-facing troubleshooting hints
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain-level failures raised by the model and the history engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// Calendar date did not parse as `YYYY-MM-DD`
    #[error("Invalid calendar date: {value}")]
    InvalidDate { value: String },

    /// Comparison period outside day/week/month
    #[error("Invalid period: {value} (expected day, week or month)")]
    InvalidPeriod { value: String },

    /// History range outside week/month/all
    #[error("Invalid range: {value} (expected week, month or all)")]
    InvalidRange { value: String },

    /// No snapshot body stored for the date (never written or expired)
    #[error("No snapshot found for {date}")]
    SnapshotMissing { date: String },

    /// The date index names a date whose snapshot body is gone
    #[error("Date index lists {date} but its snapshot is missing")]
    IndexDivergence { date: String },

    /// A stored value could not be decoded or failed validation
    #[error("Corrupt value at {key}: {reason}")]
    CorruptValue { key: String, reason: String },

    /// The data source adapter reported failure
    #[error("Upstream fetch failed: {reason}")]
    UpstreamFailed {
        reason: String,
        troubleshooting: Vec<String>,
    },

    /// No store is configured for this deployment
    #[error("Snapshot store is not configured")]
    StoreUnconfigured,

    /// Capture secret missing or wrong
    #[error("Unauthorized")]
    Unauthorised,
}

impl From<HistoryError> for ExError {
    fn from(err: HistoryError) -> Self {
        let message = err.to_string();
        match err {
            HistoryError::InvalidDate { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(value)
                .with_message(message),
            HistoryError::InvalidPeriod { .. } | HistoryError::InvalidRange { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            HistoryError::SnapshotMissing { date } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(date)
                .with_message(message),
            HistoryError::IndexDivergence { date } => {
                ExError::new(ExErrorKind::DataInconsistency)
                    .with_entity_id(date)
                    .with_message(message)
            }
            HistoryError::CorruptValue { key, .. } => ExError::new(ExErrorKind::CorruptData)
                .with_entity_id(key)
                .with_message(message),
            HistoryError::UpstreamFailed {
                troubleshooting, ..
            } => ExError::new(ExErrorKind::UpstreamFetch)
                .with_message(message)
                .with_hints(troubleshooting),
            HistoryError::StoreUnconfigured => {
                ExError::new(ExErrorKind::Configuration).with_message(message)
            }
            HistoryError::Unauthorised => {
                ExError::new(ExErrorKind::Unauthorised).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::InvalidInput,
            ExErrorKind::Configuration,
            ExErrorKind::Unauthorised,
            ExErrorKind::UpstreamFetch,
            ExErrorKind::NotFound,
            ExErrorKind::Persistence,
            ExErrorKind::DataInconsistency,
            ExErrorKind::CorruptData,
            ExErrorKind::RetryExhausted,
            ExErrorKind::Timeout,
            ExErrorKind::Serialization,
            ExErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_includes_op_and_entity() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("get_by_date")
            .with_entity_id("2026-01-10")
            .with_message("no snapshot");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_NOT_FOUND]"));
        assert!(text.contains("get_by_date"));
        assert!(text.contains("2026-01-10"));
    }

    #[test]
    fn test_source_chain_exposed() {
        let inner = ExError::new(ExErrorKind::Timeout).with_message("redis timeout");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Timeout)
        );
        assert!(std::error::Error::source(&outer).is_some());
    }
}
