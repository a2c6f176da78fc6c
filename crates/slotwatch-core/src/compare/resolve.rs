//! Choosing the comparison baseline for a period.

use serde::{Deserialize, Serialize};

use crate::index::DateIndex;
use crate::model::{CalendarDate, Period};

/// Which path picked the previous date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// `latest - period` is itself indexed
    Exact,
    /// Most recent indexed date strictly before `latest`
    Fallback,
    /// No earlier date exists
    None,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Exact => "exact",
            Resolution::Fallback => "fallback",
            Resolution::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBaseline {
    pub target_date: CalendarDate,
    pub previous_date: Option<CalendarDate>,
    pub resolution: Resolution,
}

/// Resolve the previous date to compare `latest` against.
///
/// When the exact target is missing this falls back to the newest date
/// before `latest`, which for `week`/`month` may be much closer to `latest`
/// than to the target.
pub fn resolve_previous(index: &DateIndex, latest: CalendarDate, period: Period) -> ResolvedBaseline {
    let target_date = latest.minus_days(period.days());

    if index.exists(target_date) {
        return ResolvedBaseline {
            target_date,
            previous_date: Some(target_date),
            resolution: Resolution::Exact,
        };
    }

    match index.latest_before(latest) {
        Some(prev) => ResolvedBaseline {
            target_date,
            previous_date: Some(prev),
            resolution: Resolution::Fallback,
        },
        None => ResolvedBaseline {
            target_date,
            previous_date: None,
            resolution: Resolution::None,
        },
    }
}
