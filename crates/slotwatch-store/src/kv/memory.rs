//! In-process store with clock-driven expiry.
//!
//! Used by tests and by the CLI when no remote store is configured. Expiry is
//! evaluated against the injected clock on every access, so tests can make a
//! body lapse by advancing a `ManualClock`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotwatch_core::clock::{SharedClock, SystemClock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::KvStore;
use crate::errors::{injected_write_failure, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: SharedClock,
    fail_writes: AtomicBool,
    forced_cas_conflicts: AtomicU32,
    cas_calls: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            fail_writes: AtomicBool::new(false),
            forced_cas_conflicts: AtomicU32::new(0),
            cas_calls: AtomicU64::new(0),
        }
    }

    /// Make every subsequent `set` and `compare_and_swap` fail with `Persistence`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` compare-and-swap calls report a conflict
    pub fn force_cas_conflicts(&self, count: u32) {
        self.forced_cas_conflicts.store(count, Ordering::SeqCst);
    }

    /// Total compare-and-swap calls seen, including forced conflicts
    pub fn cas_calls(&self) -> u64 {
        self.cas_calls.load(Ordering::SeqCst)
    }

    /// Drop `key` as if its TTL had elapsed
    pub async fn evict(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Live (unexpired) keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !Self::expired(e, now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Expiry instant recorded for `key`, if any
    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().await.get(key).and_then(|e| e.expires_at)
    }

    fn expired(entry: &Entry, now: DateTime<Utc>) -> bool {
        entry.expires_at.is_some_and(|at| at <= now)
    }

    fn expiry(&self, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
        ttl.map(|ttl| {
            let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
            self.clock
                .now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    fn check_writable(&self, op: &str, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_write_failure(op, key));
        }
        Ok(())
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_cas_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if Self::expired(entry, now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.check_writable("kv_set", key)?;
        let entry = Entry {
            value: value.to_vec(),
            expires_at: self.expiry(ttl),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
        ttl: Option<Duration>,
    ) -> Result<bool> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable("kv_compare_and_swap", key)?;
        if self.take_forced_conflict() {
            return Ok(false);
        }

        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let current = entries
            .get(key)
            .filter(|e| !Self::expired(e, now))
            .map(|e| e.value.as_slice());
        if current != expected {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: new.to_vec(),
                expires_at: self.expiry(ttl),
            },
        );
        Ok(true)
    }
}
