//! Slotwatch Store - key-value persistence for snapshots
//!
//! Provides:
//! - the [`KvStore`] seam (get / set with TTL / compare-and-swap)
//! - an in-process [`MemoryStore`] with clock-driven expiry and fault injection
//! - a [`RedisStore`] backed by a multiplexed async connection
//! - the snapshot key layout and typed read/write helpers

pub mod errors;
pub mod kv;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use kv::{KvStore, MemoryStore, RedisStore, SharedStore};
pub use snapshot::keys::{self, SNAPSHOT_TTL_DAYS};
