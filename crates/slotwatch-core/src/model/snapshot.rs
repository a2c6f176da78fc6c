//! Daily snapshot body and its persistence-boundary codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date::CalendarDate;
use super::record::Record;
use super::summary::Summary;
use crate::errors::{ExError, ExErrorKind, HistoryError, Result};

/// Immutable capture of one day's classified records and their summary.
///
/// `summary` is computed once at build time and stored; it is never
/// recomputed from `records` on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub date: CalendarDate,
    pub timestamp: DateTime<Utc>,
    pub headers: Vec<String>,
    pub row_count: u64,
    pub records: Vec<Record>,
    pub summary: Summary,
}

impl Snapshot {
    /// Build a snapshot for the calendar day of `captured_at`
    pub fn build(records: Vec<Record>, headers: Vec<String>, captured_at: DateTime<Utc>) -> Self {
        let summary = Summary::from_records(&records);
        Self {
            date: CalendarDate::from(captured_at.date_naive()),
            timestamp: captured_at,
            headers,
            row_count: records.len() as u64,
            records,
            summary,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("encode_snapshot")
                .with_entity_id(self.date.to_string())
                .with_message(format!("Failed to serialize snapshot: {}", e))
        })
    }

    /// Decode and validate a body read from `key`, which is expected to hold
    /// the snapshot for `expected_date`.
    ///
    /// # Errors
    ///
    /// - `CorruptData`: bytes are not a snapshot, the embedded date differs
    ///   from `expected_date`, or `rowCount` disagrees with `records`
    pub fn decode(key: &str, expected_date: CalendarDate, bytes: &[u8]) -> Result<Snapshot> {
        let corrupt = |reason: String| -> ExError {
            ExError::from(HistoryError::CorruptValue {
                key: key.to_string(),
                reason,
            })
            .with_op("decode_snapshot")
        };

        let snapshot: Snapshot =
            serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;

        if snapshot.date != expected_date {
            return Err(corrupt(format!(
                "body is dated {} but stored for {}",
                snapshot.date, expected_date
            )));
        }
        if snapshot.row_count != snapshot.records.len() as u64 {
            return Err(corrupt(format!(
                "rowCount {} does not match {} records",
                snapshot.row_count,
                snapshot.records.len()
            )));
        }
        Ok(snapshot)
    }
}
