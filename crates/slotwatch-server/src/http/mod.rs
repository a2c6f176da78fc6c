//! HTTP surface.

mod handlers;
mod request_context;
mod response;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/capture",
            get(handlers::capture).post(handlers::capture),
        )
        .route("/api/history", get(handlers::history))
        .route("/api/compare", get(handlers::compare_snapshots))
        .route("/api/data", get(handlers::live_data))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(middleware::from_fn(
            request_context::request_context_middleware,
        ))
}
