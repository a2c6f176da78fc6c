//! Single-slot read-through cache for live data.
//!
//! Entries are stamped with the injected clock; a value is served while
//! `now - stored_at <= ttl`.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::clock::SharedClock;

#[derive(Debug, Clone)]
pub struct CachedValue<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

pub struct LiveCache<T: Clone> {
    ttl: Duration,
    clock: SharedClock,
    slot: Mutex<Option<CachedValue<T>>>,
}

impl<T: Clone> LiveCache<T> {
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry, if any. An expired entry is dropped.
    pub fn get(&self) -> Option<CachedValue<T>> {
        let now = self.clock.now();
        let mut slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some(entry) if now - entry.stored_at <= self.ttl => Some(entry.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Store `value`, stamped now, and return the stamp
    pub fn put(&self, value: T) -> DateTime<Utc> {
        let stored_at = self.clock.now();
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedValue { value, stored_at });
        }
        stored_at
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn cache() -> (LiveCache<u32>, ManualClock) {
        let clock = ManualClock::at_date("2026-01-10".parse().unwrap());
        let cache = LiveCache::new(Duration::seconds(60), Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_serves_within_ttl() {
        let (cache, clock) = cache();
        assert!(cache.get().is_none());
        let stamp = cache.put(7);
        clock.advance(Duration::seconds(60));
        let hit = cache.get().unwrap();
        assert_eq!(hit.value, 7);
        assert_eq!(hit.stored_at, stamp);
    }

    #[test]
    fn test_expires_after_ttl() {
        let (cache, clock) = cache();
        cache.put(7);
        clock.advance(Duration::seconds(61));
        assert!(cache.get().is_none());
        // stays empty even if the clock is wound back
        clock.advance(Duration::seconds(-30));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_invalidate() {
        let (cache, _clock) = cache();
        cache.put(1);
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
