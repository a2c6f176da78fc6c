//! Correlation types for request tracking
//!
//! Every HTTP request and CLI invocation carries a [`RequestContext`] so that
//! log events and structured errors emitted along one capture or comparison
//! can be tied back together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header used to propagate a caller-supplied request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id we accept verbatim
const MAX_EXTERNAL_ID_LEN: usize = 128;

/// Unique identifier for a single request or operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new time-ordered RequestId (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a caller-supplied id, falling back to a fresh one when the
    /// value is empty, too long, or contains non-printable characters.
    pub fn from_external(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v)
                if !v.is_empty()
                    && v.len() <= MAX_EXTERNAL_ID_LEN
                    && v.chars().all(|c| c.is_ascii_graphic()) =>
            {
                Self(v.to_string())
            }
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an operation was triggered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// HTTP surface (scheduler hitting the capture endpoint, dashboard reads)
    Http,
    /// Operator CLI
    Cli,
    /// In-process callers such as tests
    Internal,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Http => "http",
            Origin::Cli => "cli",
            Origin::Internal => "internal",
        }
    }
}

/// Context carried through operation boundaries for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub origin: Origin,
}

impl RequestContext {
    /// Create a context with a fresh RequestId
    pub fn new(origin: Origin) -> Self {
        Self {
            request_id: RequestId::new(),
            origin,
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId, origin: Origin) -> Self {
        Self { request_id, origin }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Origin::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_external_id_accepted() {
        let id = RequestId::from_external(Some("sched-2026-01-10"));
        assert_eq!(id.as_str(), "sched-2026-01-10");
    }

    #[test]
    fn test_external_id_rejected_falls_back() {
        let blank = RequestId::from_external(Some("   "));
        assert!(!blank.as_str().trim().is_empty());

        let spaced = RequestId::from_external(Some("has space"));
        assert_ne!(spaced.as_str(), "has space");

        let long = "x".repeat(MAX_EXTERNAL_ID_LEN + 1);
        assert_ne!(RequestId::from_external(Some(&long)).as_str(), long);

        assert!(!RequestId::from_external(None).as_str().is_empty());
    }

    #[test]
    fn test_request_context_origin() {
        let ctx = RequestContext::new(Origin::Cli);
        assert_eq!(ctx.origin.as_str(), "cli");
        assert!(!ctx.request_id.as_str().is_empty());
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = RequestId::from_external(Some("abc"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
