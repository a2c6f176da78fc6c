//! Snapshot write operations.

use slotwatch_core::{CalendarDate, DateIndex, Snapshot};

use super::keys::{snapshot_key, snapshot_ttl, INDEX_KEY, LATEST_KEY};
use crate::errors::Result;
use crate::kv::KvStore;

/// Write a snapshot body under its date key with the retention TTL.
/// An existing body for the same date is overwritten.
///
/// # Errors
///
/// - `Serialization`: body could not be encoded
/// - `Persistence` / `Timeout`: store write failed
pub async fn put_snapshot(store: &dyn KvStore, snapshot: &Snapshot) -> Result<()> {
    let key = snapshot_key(snapshot.date);
    let bytes = snapshot.encode()?;
    store
        .set(&key, &bytes, Some(snapshot_ttl()))
        .await
        .map_err(|e| e.with_op("put_snapshot"))?;

    tracing::debug!(
        key = %key,
        size_bytes = bytes.len(),
        row_count = snapshot.row_count,
        "Persisted snapshot body"
    );
    Ok(())
}

/// Point the latest marker at `date`. The marker has no expiry.
///
/// # Errors
///
/// - `Persistence` / `Timeout`: store write failed
pub async fn put_latest(store: &dyn KvStore, date: CalendarDate) -> Result<()> {
    let bytes = format!("\"{date}\"");
    store
        .set(LATEST_KEY, bytes.as_bytes(), None)
        .await
        .map_err(|e| e.with_op("put_latest"))
}

/// Replace the stored index with `next` only if it still holds `expected`
/// (the raw bytes returned by the preceding read). The index has no expiry.
///
/// # Errors
///
/// - `Persistence` / `Timeout`: store call failed
pub async fn swap_index(
    store: &dyn KvStore,
    expected: Option<&[u8]>,
    next: &DateIndex,
) -> Result<bool> {
    store
        .compare_and_swap(INDEX_KEY, expected, &next.encode(), None)
        .await
        .map_err(|e| e.with_op("swap_index"))
}
