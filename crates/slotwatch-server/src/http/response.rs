use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use slotwatch_core::errors::{ExError, ExErrorKind};

/// Seconds a client should wait before retrying a 503
const RETRY_AFTER_SECS: &str = "3";

#[must_use]
pub(crate) fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ExErrorKind::Unauthorised => StatusCode::UNAUTHORIZED,
        ExErrorKind::NotFound => StatusCode::NOT_FOUND,
        ExErrorKind::Configuration | ExErrorKind::Timeout | ExErrorKind::RetryExhausted => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ExErrorKind::UpstreamFetch
        | ExErrorKind::Persistence
        | ExErrorKind::DataInconsistency
        | ExErrorKind::CorruptData
        | ExErrorKind::Serialization
        | ExErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body for `err` under a route-specific `headline`.
///
/// The body always carries `error` and `code`. An unconfigured store
/// explains itself in `message`; every other kind puts the cause in
/// `details`. Troubleshooting hints and the request id ride along when set.
#[must_use]
pub(crate) fn error_response(err: &ExError, headline: &str) -> Response {
    let status = status_for(err.kind());

    let mut body = Map::new();
    body.insert("error".into(), Value::from(headline));
    body.insert("code".into(), Value::from(err.code()));
    let detail_key = if err.kind() == ExErrorKind::Configuration {
        "message"
    } else {
        "details"
    };
    body.insert(detail_key.into(), Value::from(detail_text(err)));
    if !err.hints().is_empty() {
        body.insert("troubleshooting".into(), json!(err.hints()));
    }
    if let Some(request_id) = err.request_id() {
        body.insert("requestId".into(), Value::from(request_id.as_str()));
    }

    if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), error = %err, "request failed");
    } else {
        tracing::debug!(status = status.as_u16(), error = %err, "request rejected");
    }

    let mut resp = (status, Json(Value::Object(body))).into_response();
    if status == StatusCode::SERVICE_UNAVAILABLE && err.kind().is_retryable() {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static(RETRY_AFTER_SECS));
    }
    resp
}

fn detail_text(err: &ExError) -> String {
    if err.message().is_empty() {
        err.to_string()
    } else {
        err.message().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ExErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ExErrorKind::Unauthorised), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ExErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ExErrorKind::Configuration),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ExErrorKind::Timeout),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ExErrorKind::UpstreamFetch),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(ExErrorKind::DataInconsistency),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_sets_retry_after() {
        let err = ExError::new(ExErrorKind::Timeout).with_message("store call timed out");
        let resp = error_response(&err, "Failed to read history");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
            Some("3")
        );
    }

    #[test]
    fn test_unconfigured_store_has_no_retry_after() {
        let err = ExError::new(ExErrorKind::Configuration).with_message("no store");
        let resp = error_response(&err, "Snapshot store not configured");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.headers().get("retry-after").is_none());
    }

    #[test]
    fn test_empty_message_falls_back_to_display() {
        let err = ExError::new(ExErrorKind::Internal).with_op("compare");
        assert!(detail_text(&err).contains("ERR_INTERNAL"));
    }
}
