//! Data source adapters.
//!
//! A source reports either the current sheet (header row plus rows) or a
//! failure with operator-facing troubleshooting steps. Failure is a value,
//! not an error, so the live-data endpoint can pass the steps through.

use async_trait::async_trait;
use serde::Deserialize;
use slotwatch_core::classify::rows_from_values;
use slotwatch_core::errors::{ExError, HistoryError};
use slotwatch_core::model::RawRow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Current tabular data from the source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(SourceData),
    Failure {
        error: String,
        troubleshooting: Vec<String>,
    },
}

impl FetchOutcome {
    pub fn failure(error: impl Into<String>, troubleshooting: Vec<String>) -> Self {
        FetchOutcome::Failure {
            error: error.into(),
            troubleshooting,
        }
    }

    /// # Errors
    ///
    /// - `UpstreamFetch`: the source reported failure; hints carry the
    ///   troubleshooting steps
    pub fn into_result(self) -> Result<SourceData, ExError> {
        match self {
            FetchOutcome::Success(data) => Ok(data),
            FetchOutcome::Failure {
                error,
                troubleshooting,
            } => Err(HistoryError::UpstreamFailed {
                reason: error,
                troubleshooting,
            }
            .into()),
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn source_tag(&self) -> &'static str;

    async fn fetch_current(&self) -> FetchOutcome;
}

/// In-memory source returning a settable outcome
pub struct StaticSource {
    outcome: Mutex<FetchOutcome>,
    calls: AtomicU64,
}

impl StaticSource {
    pub fn new(data: SourceData) -> Self {
        Self::with_outcome(FetchOutcome::Success(data))
    }

    pub fn failing(error: impl Into<String>, troubleshooting: Vec<String>) -> Self {
        Self::with_outcome(FetchOutcome::failure(error, troubleshooting))
    }

    pub fn with_outcome(outcome: FetchOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicU64::new(0),
        }
    }

    /// Build from a header row and value rows
    pub fn from_values(headers: &[&str], values: &[&[&str]]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let values: Vec<Vec<String>> = values
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        let rows = rows_from_values(&headers, &values);
        Self::new(SourceData { headers, rows })
    }

    pub fn set_outcome(&self, outcome: FetchOutcome) {
        if let Ok(mut current) = self.outcome.lock() {
            *current = outcome;
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn source_tag(&self) -> &'static str {
        "static"
    }

    async fn fetch_current(&self) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome.lock() {
            Ok(outcome) => outcome.clone(),
            Err(_) => FetchOutcome::failure("static source poisoned", Vec::new()),
        }
    }
}

/// Body of a spreadsheet "values" read: `{"values": [[..header..], [..row..], ..]}`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SheetValues {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl SheetValues {
    /// First row is the header row. A sheet without one is a failure.
    pub fn into_outcome(self) -> FetchOutcome {
        let mut values = self.values.into_iter();
        let Some(headers) = values.next() else {
            return FetchOutcome::failure(
                "Sheet returned no rows",
                vec![
                    "Check that the configured range includes the header row".to_string(),
                    "Check that the sheet is not empty".to_string(),
                ],
            );
        };
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let rest: Vec<Vec<String>> = values.collect();
        let rows = rows_from_values(&headers, &rest);
        FetchOutcome::Success(SourceData { headers, rows })
    }
}

fn troubleshooting_for_status(status: reqwest::StatusCode) -> Vec<String> {
    match status.as_u16() {
        401 | 403 => vec![
            "Check that the API key is valid".to_string(),
            "Check that the sheet is shared with the service account or is public".to_string(),
        ],
        404 => vec![
            "Check the spreadsheet id in source_url".to_string(),
            "Check that the sheet tab named in the range exists".to_string(),
        ],
        429 => vec!["The sheet API is rate limiting; retry after a minute".to_string()],
        _ => vec!["Retry later; the sheet API returned an unexpected status".to_string()],
    }
}

/// Reads a spreadsheet values endpoint over HTTP
pub struct SheetsValuesSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SheetsValuesSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DataSource for SheetsValuesSource {
    fn source_tag(&self) -> &'static str {
        "sheets"
    }

    async fn fetch_current(&self) -> FetchOutcome {
        let response = match self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "sheet request failed");
                return FetchOutcome::failure(
                    format!("Could not reach the sheet API: {e}"),
                    vec![
                        "Check network connectivity from the server".to_string(),
                        "Check that source_url is correct".to_string(),
                    ],
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "sheet API returned error status");
            return FetchOutcome::failure(
                format!("Sheet API returned {status}"),
                troubleshooting_for_status(status),
            );
        }

        match response.json::<SheetValues>().await {
            Ok(values) => values.into_outcome(),
            Err(e) => FetchOutcome::failure(
                format!("Sheet API returned an unreadable body: {e}"),
                vec!["Check that source_url points at a values endpoint".to_string()],
            ),
        }
    }
}
