//! Key-value seam used by every snapshot read and write.
//!
//! ## Responsibilities
//!
//! - Point reads and writes of opaque byte values
//! - Per-key expiry supplied by the caller
//! - Atomic compare-and-swap, so index updates never lose a concurrent write
//!
//! ## Non-Responsibilities
//!
//! - Encoding or validating values (handled by `snapshot`)
//! - Retrying conflicts (handled by `slotwatch-engine`)

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Value under `key`, or `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// - `Persistence`: backend call failed
    /// - `Timeout`: backend call exceeded its deadline
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite `key`. `ttl = None` stores without expiry.
    ///
    /// # Errors
    ///
    /// - `Persistence`: backend call failed
    /// - `Timeout`: backend call exceeded its deadline
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Write `new` only if the current value equals `expected`
    /// (`None` meaning the key must be absent). Returns whether the write
    /// happened; a mismatch is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// - `Persistence`: backend call failed
    /// - `Timeout`: backend call exceeded its deadline
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
        ttl: Option<Duration>,
    ) -> Result<bool>;
}

/// Shared handle type used by the engine and the server
pub type SharedStore = Arc<dyn KvStore>;
