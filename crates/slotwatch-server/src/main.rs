//! Slotwatch HTTP server

use anyhow::Context;
use slotwatch_core::logging_facility;
use slotwatch_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = ServerConfig::load()?;
    logging_facility::init(config.log_profile);

    let state = AppState::from_config(&config)?;
    if !config.store_configured() {
        tracing::warn!("SLOTWATCH_REDIS_URL not set; history endpoints will answer 503");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        store_configured = config.store_configured(),
        "slotwatch server listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
    }
    tracing::info!("shutdown requested");
}
