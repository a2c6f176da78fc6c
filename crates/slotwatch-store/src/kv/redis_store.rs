//! Redis-backed store.
//!
//! Each call opens a multiplexed connection from the client and runs under
//! `tokio::time::timeout`; an elapsed deadline is reported as `Timeout`, any
//! Redis error as `Persistence`. Compare-and-swap runs as a Lua script so
//! the read and the conditional write are atomic on the server.
//!
//! The redis 0.24 multiplexed driver can panic when connection setup is cut
//! off mid-handshake. Calls are polled under `catch_unwind` and such a panic
//! is reported as `Persistence` instead of unwinding through the caller.

use async_trait::async_trait;
use futures::FutureExt;
use redis::AsyncCommands;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::timeout;

use super::KvStore;
use crate::errors::{backend_error, connection_error, timeout_error, Result};

/// KEYS[1] = key; ARGV = has_expected ("1"/"0"), expected, new, ttl_secs (0 = none)
const CAS_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
  if current ~= ARGV[2] then return 0 end
elseif current then
  return 0
end
local ttl = tonumber(ARGV[4])
if ttl > 0 then
  redis.call('SET', KEYS[1], ARGV[3], 'EX', ttl)
else
  redis.call('SET', KEYS[1], ARGV[3])
end
return 1
";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
    timeout: Duration,
    cas_script: redis::Script,
}

impl RedisStore {
    /// Build a store for `url`. No connection is made until the first call.
    ///
    /// # Errors
    ///
    /// - `Configuration`: `url` is not a valid Redis URL
    pub fn open(url: &str, prefix: &str, call_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| connection_error("redis", e))?;
        Ok(Self {
            client,
            prefix: prefix.trim_end_matches(':').to_string(),
            timeout: call_timeout,
            cas_script: redis::Script::new(CAS_SCRIPT),
        })
    }

    /// Namespaced key. An empty prefix leaves keys untouched.
    pub fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }

    async fn bounded<T, F>(&self, op: &str, key: &str, call: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.timeout, AssertUnwindSafe(call).catch_unwind()).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => {
                tracing::warn!(op, key, error = %e, "redis call failed");
                Err(backend_error(op, key, e))
            }
            Ok(Err(panic)) => {
                let reason = panic_reason(panic.as_ref());
                tracing::warn!(op, key, reason, "redis driver panicked");
                Err(backend_error(op, key, format!("driver panicked: {reason}")))
            }
            Err(_) => {
                tracing::warn!(
                    op,
                    key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "redis call timed out"
                );
                Err(timeout_error(op, key, self.timeout))
            }
        }
    }

    fn ttl_secs(ttl: Option<Duration>) -> u64 {
        ttl.map(|t| t.as_secs().max(1)).unwrap_or(0)
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}

#[async_trait]
impl KvStore for RedisStore {
    fn backend_tag(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let full = self.full_key(key);
        self.bounded("kv_get", key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let value: Option<Vec<u8>> = conn.get(&full).await?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let full = self.full_key(key);
        let secs = Self::ttl_secs(ttl);
        self.bounded("kv_set", key, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            if secs > 0 {
                let _: () = conn.set_ex(&full, value, secs).await?;
            } else {
                let _: () = conn.set(&full, value).await?;
            }
            Ok(())
        })
        .await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
        ttl: Option<Duration>,
    ) -> Result<bool> {
        let full = self.full_key(key);
        let has_expected = if expected.is_some() { "1" } else { "0" };
        let expected = expected.unwrap_or_default();
        let secs = Self::ttl_secs(ttl);
        let swapped: i64 = self
            .bounded("kv_compare_and_swap", key, async {
                let mut conn = self.client.get_multiplexed_async_connection().await?;
                self.cas_script
                    .key(&full)
                    .arg(has_expected)
                    .arg(expected)
                    .arg(new)
                    .arg(secs)
                    .invoke_async(&mut conn)
                    .await
            })
            .await?;
        Ok(swapped == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_namespacing() {
        let plain = RedisStore::open("redis://127.0.0.1/", "", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(plain.full_key("snapshot:dates"), "snapshot:dates");

        let scoped = RedisStore::open("redis://127.0.0.1/", "slotwatch:", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(scoped.full_key("snapshot:dates"), "slotwatch:snapshot:dates");
    }

    #[test]
    fn test_bad_url_is_configuration_error() {
        let err = RedisStore::open("not a url", "", DEFAULT_TIMEOUT)
            .err()
            .unwrap();
        assert_eq!(err.kind(), slotwatch_core::ExErrorKind::Configuration);
    }

    #[test]
    fn test_ttl_secs() {
        assert_eq!(RedisStore::ttl_secs(None), 0);
        assert_eq!(RedisStore::ttl_secs(Some(Duration::from_millis(10))), 1);
        assert_eq!(RedisStore::ttl_secs(Some(Duration::from_secs(90))), 90);
    }

    fn driver_terminated() -> redis::RedisResult<()> {
        panic!("Multiplexed connection driver unexpectedly terminated")
    }

    #[tokio::test]
    async fn test_driver_panic_is_persistence_error() {
        let store = RedisStore::open("redis://127.0.0.1/", "", DEFAULT_TIMEOUT).unwrap();
        let err = store
            .bounded("kv_get", "snapshot:dates", async { driver_terminated() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), slotwatch_core::ExErrorKind::Persistence);
        assert!(err.message().contains("unexpectedly terminated"));
    }

    #[tokio::test]
    async fn test_stalled_call_is_timeout_error() {
        let store =
            RedisStore::open("redis://127.0.0.1/", "", Duration::from_millis(20)).unwrap();
        let err = store
            .bounded(
                "kv_set",
                "snapshot:dates",
                std::future::pending::<redis::RedisResult<()>>(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), slotwatch_core::ExErrorKind::Timeout);
    }
}
