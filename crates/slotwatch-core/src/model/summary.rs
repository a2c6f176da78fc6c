//! Aggregate metrics derived from a record collection.

use serde::{Deserialize, Serialize};

use super::record::{CategoryType, Record};

/// Round to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_rows: u64,
    pub hrt_count: u64,
    pub trt_count: u64,
    pub provider_count: u64,
    pub error_count: u64,
    /// Mean of non-null `daysOut`, one decimal; null when no record has one
    pub avg_days_out: Option<f64>,
}

impl Summary {
    /// Derive a summary from classified records. Deterministic: the same
    /// records always produce the same summary.
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Summary {
            total_rows: records.len() as u64,
            ..Summary::default()
        };
        let mut days_total: i128 = 0;
        let mut days_seen: u64 = 0;

        for record in records {
            match record.category_type {
                CategoryType::Hrt => summary.hrt_count += 1,
                CategoryType::Trt => summary.trt_count += 1,
                CategoryType::Provider => summary.provider_count += 1,
                CategoryType::Other => {}
            }
            if record.has_error {
                summary.error_count += 1;
            }
            if let Some(days) = record.days_out {
                days_total += i128::from(days);
                days_seen += 1;
            }
        }

        summary.avg_days_out =
            (days_seen > 0).then(|| round1(days_total as f64 / days_seen as f64));
        summary
    }

    /// Errors as a fraction of total rows; zero when there are no rows
    pub fn error_ratio(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.error_count as f64 / self.total_rows as f64
        }
    }
}
