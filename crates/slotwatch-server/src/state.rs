//! Shared handler state.

use serde::Serialize;
use slotwatch_core::cache::LiveCache;
use slotwatch_core::classify::RowClassifier;
use slotwatch_core::clock::{SharedClock, SystemClock};
use slotwatch_core::errors::{ExError, HistoryError};
use slotwatch_core::{Record, Summary};
use slotwatch_core_types::Sensitive;
use slotwatch_engine::{DataSource, EngineContext, SheetsValuesSource, StaticSource};
use slotwatch_store::kv::{RedisStore, SharedStore};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;

/// Classified live data as served by `/api/data`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveData {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub summary: Summary,
}

#[derive(Clone)]
pub struct AppState {
    /// `None` when no store URL is configured
    pub store: Option<SharedStore>,
    pub clock: SharedClock,
    pub source: Arc<dyn DataSource>,
    pub classifier: Arc<dyn RowClassifier>,
    pub live_cache: Arc<LiveCache<LiveData>>,
    pub capture_secret: Option<Sensitive<String>>,
}

impl AppState {
    pub fn new(
        store: Option<SharedStore>,
        clock: SharedClock,
        source: Arc<dyn DataSource>,
        classifier: Arc<dyn RowClassifier>,
        live_cache_ttl: Duration,
    ) -> Self {
        let ttl = chrono::Duration::from_std(live_cache_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        Self {
            store,
            live_cache: Arc::new(LiveCache::new(ttl, clock.clone())),
            clock,
            source,
            classifier,
            capture_secret: None,
        }
    }

    pub fn with_capture_secret(mut self, secret: impl Into<String>) -> Self {
        self.capture_secret = Some(Sensitive::new(secret.into()));
        self
    }

    /// Wire the production collaborators described by `config`.
    ///
    /// # Errors
    ///
    /// - `Configuration`: the store URL is malformed
    pub fn from_config(config: &ServerConfig) -> Result<Self, ExError> {
        let store = open_store(config)?;
        let mut state = Self::new(
            store,
            Arc::new(SystemClock),
            build_source(config),
            Arc::new(config.columns.clone()),
            config.live_cache_ttl,
        );
        state.capture_secret = config.capture_secret.clone();
        Ok(state)
    }

    /// Engine context over the configured store.
    ///
    /// # Errors
    ///
    /// - `Configuration`: no store is configured
    pub fn engine(&self) -> Result<EngineContext, ExError> {
        let store = self.store.clone().ok_or_else(|| {
            ExError::from(HistoryError::StoreUnconfigured)
                .with_message("Set SLOTWATCH_REDIS_URL to enable snapshot history")
        })?;
        Ok(EngineContext::new(
            store,
            self.clock.clone(),
            self.source.clone(),
            self.classifier.clone(),
        ))
    }
}

/// Open the Redis store, or `None` when no URL is configured.
///
/// # Errors
///
/// - `Configuration`: the URL does not parse
pub fn open_store(config: &ServerConfig) -> Result<Option<SharedStore>, ExError> {
    let Some(url) = config.redis_url.as_ref() else {
        return Ok(None);
    };
    let store = RedisStore::open(url.expose(), &config.redis_prefix, config.store_timeout)?;
    Ok(Some(Arc::new(store)))
}

/// The sheet adapter, or a source that always reports how to configure one
pub fn build_source(config: &ServerConfig) -> Arc<dyn DataSource> {
    match config.source_url.as_deref() {
        Some(url) => Arc::new(SheetsValuesSource::new(url, config.source_timeout)),
        None => Arc::new(StaticSource::failing(
            "No data source configured",
            vec!["Set SLOTWATCH_SOURCE_URL to a sheet values endpoint".to_string()],
        )),
    }
}
