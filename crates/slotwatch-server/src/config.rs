//! Process configuration.
//!
//! Layered as: built-in defaults, then `SLOTWATCH_*` environment variables
//! (after `.env` is loaded by the binary). `SLOTWATCH_REDIS_URL` unset or
//! blank leaves the snapshot store unconfigured; history endpoints then
//! answer 503 and live data keeps working.

use serde::Deserialize;
use slotwatch_core::classify::ColumnClassifier;
use slotwatch_core::errors::{ExError, ExErrorKind};
use slotwatch_core::logging_facility::Profile;
use slotwatch_core_types::Sensitive;
use std::collections::HashMap;
use std::time::Duration;

pub const ENV_PREFIX: &str = "SLOTWATCH";

#[derive(Debug, Deserialize)]
struct RawConfig {
    bind_addr: String,
    redis_url: Option<String>,
    redis_prefix: String,
    store_timeout_ms: u64,
    capture_secret: Option<String>,
    source_url: Option<String>,
    source_timeout_ms: u64,
    live_cache_ttl_secs: u64,
    log_profile: String,
    category_column: String,
    days_out_column: String,
    score_column: String,
    error_column: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// May embed credentials
    pub redis_url: Option<Sensitive<String>>,
    pub redis_prefix: String,
    pub store_timeout: Duration,
    /// Bearer token required by the capture endpoint, when set
    pub capture_secret: Option<Sensitive<String>>,
    pub source_url: Option<String>,
    pub source_timeout: Duration,
    pub live_cache_ttl: Duration,
    pub log_profile: Profile,
    /// Sheet column names read by the row classifier
    pub columns: ColumnClassifier,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// - `Configuration`: a value failed to parse
    pub fn load() -> Result<Self, ExError> {
        Self::from_source(None)
    }

    /// Load from an explicit variable map instead of the environment.
    /// Keys are full variable names, e.g. `SLOTWATCH_REDIS_URL`.
    ///
    /// # Errors
    ///
    /// - `Configuration`: a value failed to parse
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ExError> {
        Self::from_source(Some(vars))
    }

    fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, ExError> {
        let columns = ColumnClassifier::default();
        let settings = config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:3000")
            .and_then(|b| b.set_default("redis_prefix", ""))
            .and_then(|b| b.set_default("store_timeout_ms", 2_000_i64))
            .and_then(|b| b.set_default("source_timeout_ms", 10_000_i64))
            .and_then(|b| b.set_default("live_cache_ttl_secs", 60_i64))
            .and_then(|b| b.set_default("log_profile", "development"))
            .and_then(|b| b.set_default("category_column", columns.category_column))
            .and_then(|b| b.set_default("days_out_column", columns.days_out_column))
            .and_then(|b| b.set_default("score_column", columns.score_column))
            .and_then(|b| b.set_default("error_column", columns.error_column))
            .map_err(config_error)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .map_err(config_error)?;

        let raw: RawConfig = settings.try_deserialize().map_err(config_error)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ExError> {
        let log_profile = raw.log_profile.parse::<Profile>().map_err(|reason| {
            ExError::new(ExErrorKind::Configuration)
                .with_op("load_config")
                .with_entity_id("log_profile")
                .with_message(reason)
        })?;

        Ok(Self {
            bind_addr: raw.bind_addr,
            redis_url: non_blank(raw.redis_url).map(Sensitive::new),
            redis_prefix: raw.redis_prefix.trim().to_string(),
            store_timeout: Duration::from_millis(raw.store_timeout_ms),
            capture_secret: non_blank(raw.capture_secret).map(Sensitive::new),
            source_url: non_blank(raw.source_url),
            source_timeout: Duration::from_millis(raw.source_timeout_ms),
            live_cache_ttl: Duration::from_secs(raw.live_cache_ttl_secs),
            log_profile,
            columns: ColumnClassifier::default()
                .with_category_column(raw.category_column.trim())
                .with_days_out_column(raw.days_out_column.trim())
                .with_score_column(raw.score_column.trim())
                .with_error_column(raw.error_column.trim()),
        })
    }

    pub fn store_configured(&self) -> bool {
        self.redis_url.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn config_error(err: config::ConfigError) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("load_config")
        .with_message(err.to_string())
}
