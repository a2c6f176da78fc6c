//! Date index manager.
//!
//! Reads go through a retention view that hides dates whose bodies have
//! certainly expired; the stored index is only ever changed by
//! [`DateIndexManager::record`], which uses compare-and-swap with a bounded
//! number of attempts.

use slotwatch_core::clock::Clock;
use slotwatch_core::errors::{ExError, ExErrorKind};
use slotwatch_core::{CalendarDate, DateIndex};
use slotwatch_store::errors::Result;
use slotwatch_store::kv::KvStore;
use slotwatch_store::snapshot::{fetch_index, swap_index};
use slotwatch_store::SNAPSHOT_TTL_DAYS;

/// Compare-and-swap attempts before giving up with `RetryExhausted`
pub const MAX_INDEX_ATTEMPTS: u32 = 5;

/// Oldest date whose body may still exist on `today`
pub fn retention_cutoff(today: CalendarDate) -> CalendarDate {
    today.minus_days(SNAPSHOT_TTL_DAYS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Whether the stored index changed
    pub inserted: bool,
    pub attempts: u32,
    pub len: usize,
}

pub struct DateIndexManager<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
}

impl<'a> DateIndexManager<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Index as stored, without the retention view
    ///
    /// # Errors
    ///
    /// - `CorruptData`: stored index does not decode
    /// - `Persistence` / `Timeout`: store read failed
    pub async fn load_raw(&self) -> Result<DateIndex> {
        Ok(fetch_index(self.store).await?.index)
    }

    /// Index as readers should see it
    ///
    /// # Errors
    ///
    /// - `CorruptData`: stored index does not decode
    /// - `Persistence` / `Timeout`: store read failed
    pub async fn load(&self) -> Result<DateIndex> {
        let raw = self.load_raw().await?;
        let view = raw.retained_since(retention_cutoff(self.clock.today()));
        if view.len() != raw.len() {
            tracing::debug!(
                stored = raw.len(),
                visible = view.len(),
                "hid index entries past retention"
            );
        }
        Ok(view)
    }

    /// Add `date` to the stored index.
    ///
    /// Re-reads and retries when another writer changed the index between
    /// the read and the swap.
    ///
    /// # Errors
    ///
    /// - `RetryExhausted`: every attempt lost a race
    /// - `CorruptData`: stored index does not decode
    /// - `Persistence` / `Timeout`: store call failed
    pub async fn record(&self, date: CalendarDate) -> Result<RecordOutcome> {
        for attempt in 1..=MAX_INDEX_ATTEMPTS {
            let stored = fetch_index(self.store).await?;
            let mut next = stored.index;
            if !next.insert(date) {
                return Ok(RecordOutcome {
                    inserted: false,
                    attempts: attempt,
                    len: next.len(),
                });
            }

            if swap_index(self.store, stored.raw.as_deref(), &next).await? {
                return Ok(RecordOutcome {
                    inserted: true,
                    attempts: attempt,
                    len: next.len(),
                });
            }
            tracing::debug!(date = %date, attempt, "date index changed concurrently, retrying");
        }

        Err(ExError::new(ExErrorKind::RetryExhausted)
            .with_op("record_date")
            .with_entity_id(date.to_string())
            .with_message(format!(
                "Date index update lost {} consecutive races",
                MAX_INDEX_ATTEMPTS
            )))
    }

    /// # Errors
    ///
    /// - `CorruptData` / `Persistence` / `Timeout`: see [`load`](Self::load)
    pub async fn exists(&self, date: CalendarDate) -> Result<bool> {
        Ok(self.load().await?.exists(date))
    }

    /// # Errors
    ///
    /// - `CorruptData` / `Persistence` / `Timeout`: see [`load`](Self::load)
    pub async fn nearest_at_or_before(&self, date: CalendarDate) -> Result<Option<CalendarDate>> {
        Ok(self.load().await?.nearest_at_or_before(date))
    }

    /// # Errors
    ///
    /// - `CorruptData` / `Persistence` / `Timeout`: see [`load`](Self::load)
    pub async fn all_ascending(&self) -> Result<Vec<CalendarDate>> {
        Ok(self.load().await?.ascending().to_vec())
    }

    /// # Errors
    ///
    /// - `CorruptData` / `Persistence` / `Timeout`: see [`load`](Self::load)
    pub async fn all_descending(&self) -> Result<Vec<CalendarDate>> {
        Ok(self.load().await?.descending())
    }
}
