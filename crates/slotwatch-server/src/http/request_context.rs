use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use slotwatch_core_types::{Origin, RequestContext, RequestId, REQUEST_ID_HEADER};
use tracing::Instrument;

/// Attach a [`RequestContext`] to every request and echo its id back.
///
/// A caller-supplied `x-request-id` is kept when it is well formed.
pub(crate) async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let started = std::time::Instant::now();
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let request_id = RequestId::from_external(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    request
        .extensions_mut()
        .insert(RequestContext::with_request_id(request_id.clone(), Origin::Http));

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );
    let mut response = next.run(request).instrument(span).await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        route = %route,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
