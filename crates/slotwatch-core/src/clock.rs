//! Injectable wall clock
//!
//! Capture dates, trailing-range windows, store TTLs and the live-data cache
//! all read time through [`Clock`] so tests can pin or advance it.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use crate::model::CalendarDate;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date
    fn today(&self) -> CalendarDate {
        CalendarDate::from(self.now().date_naive())
    }
}

/// Shared handle type used across crates
pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Clock pinned to noon UTC on `date`
    pub fn at_date(date: CalendarDate) -> Self {
        Self::new(date.noon_utc())
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }

    pub fn set_date(&self, date: CalendarDate) {
        self.set(date.noon_utc());
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}
