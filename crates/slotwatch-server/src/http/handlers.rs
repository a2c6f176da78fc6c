//! Route handlers.
//!
//! Handlers validate query input, dispatch an [`EngineCommand`] through
//! `apply_engine_command` (the same path the CLI takes), and shape the JSON
//! body. Lifecycle logging belongs to the engine commands.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use slotwatch_core::errors::{ExError, ExErrorKind, HistoryError};
use slotwatch_core::{CalendarDate, HistoryRange, Period, Summary};
use slotwatch_core_types::RequestContext;
use slotwatch_engine::commands::capture::CaptureResult;
use slotwatch_engine::{apply_engine_command, EngineCommand, EngineCommandResult, FetchOutcome};

use super::response::error_response;
use crate::state::{AppState, LiveData};

const STORE_UNCONFIGURED: &str = "Snapshot store not configured";

#[derive(Debug, Serialize)]
struct CaptureBody {
    success: bool,
    #[serde(flatten)]
    result: CaptureResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveDataBody {
    success: bool,
    #[serde(flatten)]
    data: LiveData,
    cached: bool,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    date: Option<String>,
    range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompareQuery {
    period: Option<String>,
}

fn fail(err: ExError, ctx: &RequestContext, headline: &str) -> Response {
    error_response(&err.with_request_id(ctx.request_id.clone()), headline)
}

/// A command answered with a result of the wrong shape
fn mismatched(op: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op.to_string())
        .with_message("Engine returned an unexpected result")
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// `GET|POST /api/capture`
pub(crate) async fn capture(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
) -> Response {
    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return fail(e, &ctx, STORE_UNCONFIGURED),
    };

    if let Some(secret) = &state.capture_secret {
        if !bearer_token(&headers).is_some_and(|token| secret.matches(token)) {
            let err = ExError::from(HistoryError::Unauthorised).with_op("capture");
            return fail(err, &ctx, "Unauthorized");
        }
    }

    match apply_engine_command(EngineCommand::Capture, &engine).await {
        Ok(EngineCommandResult::Captured(result)) => Json(CaptureBody {
            success: true,
            result,
        })
        .into_response(),
        Ok(_) => fail(mismatched("capture"), &ctx, "Failed to capture snapshot"),
        Err(e) => fail(e, &ctx, "Failed to capture snapshot"),
    }
}

/// `GET /api/history?date=YYYY-MM-DD` or `GET /api/history?range=week|month|all`
pub(crate) async fn history(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    enum Lookup {
        Date(CalendarDate),
        Range(HistoryRange),
    }

    let lookup = match (query.date.as_deref(), query.range.as_deref()) {
        (Some(raw), _) => raw.parse().map(Lookup::Date),
        (None, Some(raw)) => raw.parse().map(Lookup::Range),
        (None, None) => {
            let err = ExError::new(ExErrorKind::InvalidInput)
                .with_op("history")
                .with_message("Provide either a date or a range query parameter");
            return fail(err, &ctx, "Invalid request");
        }
    };
    let lookup = match lookup {
        Ok(lookup) => lookup,
        Err(e) => return fail(e.into(), &ctx, "Invalid request"),
    };

    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return fail(e, &ctx, STORE_UNCONFIGURED),
    };

    match lookup {
        Lookup::Date(date) => {
            match apply_engine_command(EngineCommand::ShowDate { date }, &engine).await {
                Ok(EngineCommandResult::Snapshot(snapshot)) => Json(snapshot).into_response(),
                Ok(_) => fail(mismatched("history"), &ctx, "Failed to read snapshot"),
                Err(e) if e.kind() == ExErrorKind::NotFound => {
                    fail(e, &ctx, &format!("No snapshot found for {date}"))
                }
                Err(e) => fail(e, &ctx, "Failed to read snapshot"),
            }
        }
        Lookup::Range(range) => {
            match apply_engine_command(EngineCommand::Range { range }, &engine).await {
                Ok(EngineCommandResult::Range(view)) => Json(view).into_response(),
                Ok(_) => fail(mismatched("history"), &ctx, "Failed to read history"),
                Err(e) => fail(e, &ctx, "Failed to read history"),
            }
        }
    }
}

/// `GET /api/compare?period=day|week|month`
pub(crate) async fn compare_snapshots(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<CompareQuery>,
) -> Response {
    let period = match query.period.as_deref().map(str::parse::<Period>) {
        None => Period::default(),
        Some(Ok(period)) => period,
        Some(Err(e)) => return fail(e.into(), &ctx, "Invalid request"),
    };

    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return fail(e, &ctx, STORE_UNCONFIGURED),
    };

    match apply_engine_command(EngineCommand::Compare { period }, &engine).await {
        Ok(EngineCommandResult::Comparison(result)) => Json(result).into_response(),
        Ok(_) => fail(mismatched("compare"), &ctx, "Failed to compare snapshots"),
        Err(e) => fail(e, &ctx, "Failed to compare snapshots"),
    }
}

/// `GET /api/data`: current data through the live cache
pub(crate) async fn live_data(State(state): State<AppState>) -> Response {
    if let Some(hit) = state.live_cache.get() {
        tracing::debug!(stored_at = %hit.stored_at, "live data served from cache");
        return Json(LiveDataBody {
            success: true,
            data: hit.value,
            cached: true,
            fetched_at: hit.stored_at,
        })
        .into_response();
    }

    match state.source.fetch_current().await {
        FetchOutcome::Success(fetched) => {
            let records = state.classifier.classify(&fetched.headers, &fetched.rows);
            let data = LiveData {
                summary: Summary::from_records(&records),
                headers: fetched.headers,
                records,
            };
            let fetched_at = state.live_cache.put(data.clone());
            Json(LiveDataBody {
                success: true,
                data,
                cached: false,
                fetched_at,
            })
            .into_response()
        }
        FetchOutcome::Failure {
            error,
            troubleshooting,
        } => {
            tracing::warn!(source = state.source.source_tag(), error = %error, "live fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": error,
                    "code": ExErrorKind::UpstreamFetch.code(),
                    "troubleshooting": troubleshooting,
                })),
            )
                .into_response()
        }
    }
}

/// `GET /healthz`
pub(crate) async fn healthz(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "storeConfigured": state.store.is_some(),
        "storeBackend": state.store.as_ref().map(|s| s.backend_tag()),
    }))
    .into_response()
}
