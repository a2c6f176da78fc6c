//! Bounded, sorted set of snapshot dates.
//!
//! ## Invariants
//!
//! - entries are unique
//! - entries are sorted ascending
//! - at most [`MAX_INDEX_ENTRIES`] entries; inserting past the bound drops
//!   the chronologically oldest date, not the first inserted one
//!
//! Stored on the wire as a plain JSON array of `YYYY-MM-DD` strings.

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, HistoryError, Result};
use crate::model::CalendarDate;

/// Most recent distinct dates retained in the index
pub const MAX_INDEX_ENTRIES: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateIndex {
    dates: Vec<CalendarDate>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary dates, normalizing order, duplicates and bound
    pub fn from_dates(dates: impl IntoIterator<Item = CalendarDate>) -> Self {
        let mut dates: Vec<CalendarDate> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        let mut index = Self { dates };
        index.truncate_to_bound();
        index
    }

    /// Decode a stored index. Values written by other tools may be unsorted
    /// or carry duplicates; both are normalized rather than rejected.
    ///
    /// # Errors
    ///
    /// - `CorruptData`: not a JSON array of calendar date strings
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        let dates: Vec<CalendarDate> = serde_json::from_slice(bytes).map_err(|e| {
            ExError::from(HistoryError::CorruptValue {
                key: key.to_string(),
                reason: e.to_string(),
            })
            .with_op("decode_date_index")
        })?;
        Ok(Self::from_dates(dates))
    }

    pub fn encode(&self) -> Vec<u8> {
        // A Vec of strings always serializes.
        serde_json::to_vec(&self.dates).unwrap_or_else(|_| b"[]".to_vec())
    }

    /// Insert `date` if absent, keeping order and the size bound.
    ///
    /// Returns `false` when the index is unchanged: either `date` was
    /// already present, or it is older than every retained entry of a full
    /// index and would be trimmed immediately.
    pub fn insert(&mut self, date: CalendarDate) -> bool {
        match self.dates.binary_search(&date) {
            Ok(_) => false,
            Err(pos) => {
                self.dates.insert(pos, date);
                self.truncate_to_bound();
                self.dates.binary_search(&date).is_ok()
            }
        }
    }

    fn truncate_to_bound(&mut self) {
        if self.dates.len() > MAX_INDEX_ENTRIES {
            let excess = self.dates.len() - MAX_INDEX_ENTRIES;
            self.dates.drain(..excess);
        }
    }

    pub fn exists(&self, date: CalendarDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Greatest entry `<= date`
    pub fn nearest_at_or_before(&self, date: CalendarDate) -> Option<CalendarDate> {
        let upper = self.dates.partition_point(|d| *d <= date);
        upper.checked_sub(1).map(|i| self.dates[i])
    }

    /// Greatest entry `< date`
    pub fn latest_before(&self, date: CalendarDate) -> Option<CalendarDate> {
        let upper = self.dates.partition_point(|d| *d < date);
        upper.checked_sub(1).map(|i| self.dates[i])
    }

    pub fn newest(&self) -> Option<CalendarDate> {
        self.dates.last().copied()
    }

    pub fn oldest(&self) -> Option<CalendarDate> {
        self.dates.first().copied()
    }

    pub fn ascending(&self) -> &[CalendarDate] {
        &self.dates
    }

    pub fn descending(&self) -> Vec<CalendarDate> {
        self.dates.iter().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// View without entries older than `cutoff`. Used to hide dates whose
    /// bodies have certainly expired; the stored index is not modified.
    pub fn retained_since(&self, cutoff: CalendarDate) -> DateIndex {
        let start = self.dates.partition_point(|d| *d < cutoff);
        DateIndex {
            dates: self.dates[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn index(dates: &[&str]) -> DateIndex {
        DateIndex::from_dates(dates.iter().map(|s| d(s)))
    }

    #[test]
    fn test_empty_index_queries_are_defined() {
        let idx = DateIndex::new();
        assert!(!idx.exists(d("2026-01-01")));
        assert_eq!(idx.nearest_at_or_before(d("2026-01-01")), None);
        assert_eq!(idx.latest_before(d("2026-01-01")), None);
        assert_eq!(idx.newest(), None);
        assert!(idx.descending().is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut idx = DateIndex::new();
        assert!(idx.insert(d("2026-01-05")));
        assert!(!idx.insert(d("2026-01-05")));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_nearest_at_or_before() {
        let idx = index(&["2026-01-01", "2026-01-05", "2026-01-10"]);
        assert_eq!(idx.nearest_at_or_before(d("2026-01-05")), Some(d("2026-01-05")));
        assert_eq!(idx.nearest_at_or_before(d("2026-01-07")), Some(d("2026-01-05")));
        assert_eq!(idx.nearest_at_or_before(d("2026-02-01")), Some(d("2026-01-10")));
        assert_eq!(idx.nearest_at_or_before(d("2025-12-31")), None);
    }

    #[test]
    fn test_latest_before_is_strict() {
        let idx = index(&["2026-01-01", "2026-01-05", "2026-01-10"]);
        assert_eq!(idx.latest_before(d("2026-01-10")), Some(d("2026-01-05")));
        assert_eq!(idx.latest_before(d("2026-01-01")), None);
    }

    #[test]
    fn test_overflow_drops_oldest_not_first_inserted() {
        let start = d("2026-01-01");
        let mut dates: Vec<CalendarDate> = (0..91).map(|i| start.plus_days(i)).collect();
        // Insert the oldest date last.
        dates.rotate_left(1);

        let mut idx = DateIndex::new();
        for date in &dates {
            idx.insert(*date);
        }

        assert_eq!(idx.len(), MAX_INDEX_ENTRIES);
        assert!(!idx.exists(start));
        assert_eq!(idx.oldest(), Some(start.plus_days(1)));
        assert_eq!(idx.newest(), Some(start.plus_days(90)));
    }

    #[test]
    fn test_insert_older_than_full_index_is_noop() {
        let start = d("2026-01-01");
        let mut idx = DateIndex::from_dates((1..=90).map(|i| start.plus_days(i)));
        let before = idx.clone();
        assert!(!idx.insert(start));
        assert_eq!(idx, before);
    }

    #[test]
    fn test_decode_normalizes_and_rejects_garbage() {
        let idx =
            DateIndex::decode("snapshot:dates", br#"["2026-01-05","2026-01-01","2026-01-05"]"#)
                .unwrap();
        assert_eq!(idx.ascending(), &[d("2026-01-01"), d("2026-01-05")]);

        assert!(DateIndex::decode("snapshot:dates", b"{}").is_err());
        assert!(DateIndex::decode("snapshot:dates", br#"["2026-13-01"]"#).is_err());
    }

    #[test]
    fn test_encode_is_plain_string_array() {
        let idx = index(&["2026-01-02", "2026-01-01"]);
        assert_eq!(idx.encode(), br#"["2026-01-01","2026-01-02"]"#.to_vec());
    }

    #[test]
    fn test_retained_since() {
        let idx = index(&["2025-09-01", "2025-12-01", "2026-01-01"]);
        let view = idx.retained_since(d("2025-11-01"));
        assert_eq!(view.ascending(), &[d("2025-12-01"), d("2026-01-01")]);
        assert_eq!(idx.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_insert_keeps_invariants(offsets in proptest::collection::vec(0u32..400, 0..200)) {
            let base = d("2025-01-01");
            let mut idx = DateIndex::new();
            for off in &offsets {
                idx.insert(base.plus_days(*off));
            }
            let dates = idx.ascending();
            prop_assert!(dates.len() <= MAX_INDEX_ENTRIES);
            prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));

            let mut distinct: Vec<u32> = offsets.clone();
            distinct.sort_unstable();
            distinct.dedup();
            let expected: Vec<CalendarDate> = distinct
                .iter()
                .rev()
                .take(MAX_INDEX_ENTRIES)
                .rev()
                .map(|o| base.plus_days(*o))
                .collect();
            prop_assert_eq!(dates.to_vec(), expected);
        }
    }
}
