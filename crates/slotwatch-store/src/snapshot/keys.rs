//! Key layout and retention constants.

use slotwatch_core::CalendarDate;
use std::time::Duration;

pub const SNAPSHOT_KEY_PREFIX: &str = "snapshot:";
pub const INDEX_KEY: &str = "snapshot:dates";
pub const LATEST_KEY: &str = "snapshot:latest";

/// Days a snapshot body lives before the store expires it
pub const SNAPSHOT_TTL_DAYS: u32 = 90;

pub fn snapshot_key(date: CalendarDate) -> String {
    format!("{SNAPSHOT_KEY_PREFIX}{date}")
}

pub fn snapshot_ttl() -> Duration {
    Duration::from_secs(u64::from(SNAPSHOT_TTL_DAYS) * 24 * 60 * 60)
}
