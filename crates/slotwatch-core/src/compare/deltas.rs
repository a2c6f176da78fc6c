//! Period-over-period deltas between two summaries.

use serde::{Deserialize, Serialize};

use crate::model::{round1, Summary};

/// Change from `previous` to `current`. Count fields are signed differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryChanges {
    pub total_rows: i64,
    /// Relative change in total rows, percent, one decimal; null when the
    /// previous total was zero
    pub total_rows_percent: Option<f64>,
    pub hrt_count: i64,
    pub trt_count: i64,
    pub provider_count: i64,
    pub error_count: i64,
    /// Null unless both sides have an average
    pub avg_days_out: Option<f64>,
    /// Difference in error rate, percentage points, one decimal
    pub error_rate: f64,
}

fn signed_diff(current: u64, previous: u64) -> i64 {
    (i128::from(current) - i128::from(previous)) as i64
}

/// Error-rate difference in percentage points, one decimal.
/// A zero-row summary has a zero error rate.
pub fn error_rate_delta(current: &Summary, previous: &Summary) -> f64 {
    round1((current.error_ratio() - previous.error_ratio()) * 100.0)
}

pub fn compute_changes(current: &Summary, previous: &Summary) -> SummaryChanges {
    let total_rows_percent = (previous.total_rows != 0).then(|| {
        let diff = current.total_rows as f64 - previous.total_rows as f64;
        round1(diff / previous.total_rows as f64 * 100.0)
    });

    let avg_days_out = match (current.avg_days_out, previous.avg_days_out) {
        (Some(c), Some(p)) => Some(round1(c - p)),
        _ => None,
    };

    SummaryChanges {
        total_rows: signed_diff(current.total_rows, previous.total_rows),
        total_rows_percent,
        hrt_count: signed_diff(current.hrt_count, previous.hrt_count),
        trt_count: signed_diff(current.trt_count, previous.trt_count),
        provider_count: signed_diff(current.provider_count, previous.provider_count),
        error_count: signed_diff(current.error_count, previous.error_count),
        avg_days_out,
        error_rate: error_rate_delta(current, previous),
    }
}
