//! Read-only snapshot queries.

use slotwatch_core::errors::{ExError, HistoryError};
use slotwatch_core::{CalendarDate, DateIndex, Snapshot};

use super::keys::{snapshot_key, INDEX_KEY, LATEST_KEY};
use crate::errors::Result;
use crate::kv::KvStore;

/// Index as stored, plus the raw bytes it was decoded from so a later
/// compare-and-swap can assert nothing changed in between.
#[derive(Debug, Clone, Default)]
pub struct StoredIndex {
    pub raw: Option<Vec<u8>>,
    pub index: DateIndex,
}

/// Fetch and validate the body for `date`. `None` when absent or expired.
///
/// # Errors
///
/// - `CorruptData`: stored bytes do not decode to a snapshot for `date`
/// - `Persistence` / `Timeout`: store read failed
pub async fn fetch_snapshot(store: &dyn KvStore, date: CalendarDate) -> Result<Option<Snapshot>> {
    let key = snapshot_key(date);
    let Some(bytes) = store
        .get(&key)
        .await
        .map_err(|e| e.with_op("fetch_snapshot"))?
    else {
        return Ok(None);
    };
    Snapshot::decode(&key, date, &bytes).map(Some)
}

/// Fetch the date index. An absent key is an empty index.
///
/// # Errors
///
/// - `CorruptData`: stored value is not a JSON array of dates
/// - `Persistence` / `Timeout`: store read failed
pub async fn fetch_index(store: &dyn KvStore) -> Result<StoredIndex> {
    let raw = store
        .get(INDEX_KEY)
        .await
        .map_err(|e| e.with_op("fetch_index"))?;
    let index = match raw.as_deref() {
        Some(bytes) => DateIndex::decode(INDEX_KEY, bytes)?,
        None => DateIndex::new(),
    };
    Ok(StoredIndex { raw, index })
}

/// Date named by the latest marker, if one was ever written.
///
/// # Errors
///
/// - `CorruptData`: marker is not a calendar date
/// - `Persistence` / `Timeout`: store read failed
pub async fn fetch_latest_date(store: &dyn KvStore) -> Result<Option<CalendarDate>> {
    let Some(bytes) = store
        .get(LATEST_KEY)
        .await
        .map_err(|e| e.with_op("fetch_latest_date"))?
    else {
        return Ok(None);
    };

    // Accept both a JSON string and a bare date.
    let text = String::from_utf8_lossy(&bytes);
    let text = text.trim().trim_matches('"');
    text.parse::<CalendarDate>().map(Some).map_err(|_| {
        ExError::from(HistoryError::CorruptValue {
            key: LATEST_KEY.to_string(),
            reason: format!("not a calendar date: {text}"),
        })
        .with_op("fetch_latest_date")
    })
}
