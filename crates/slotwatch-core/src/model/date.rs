//! Calendar dates, comparison periods and history ranges.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::HistoryError;

/// A UTC calendar day, always rendered as `YYYY-MM-DD`.
///
/// For this format lexicographic order equals chronological order, and the
/// derived `Ord` on the inner `NaiveDate` agrees with both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// `self - days`, saturating at the earliest representable date
    pub fn minus_days(&self, days: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    pub fn plus_days(&self, days: u32) -> Self {
        Self(
            self.0
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    /// The `count` calendar dates ending at `self` inclusive, ascending.
    pub fn trailing(&self, count: u32) -> Vec<CalendarDate> {
        (0..count).rev().map(|back| self.minus_days(back)).collect()
    }

    /// Noon UTC on this date. Used to pin test clocks away from midnight.
    pub fn noon_utc(&self) -> chrono::DateTime<Utc> {
        let midday = self.0.and_hms_opt(12, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&midday)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HistoryError::InvalidDate {
            value: s.to_string(),
        };
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shape_ok {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = HistoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Comparison period for period-over-period deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    /// Distance in calendar days from the latest snapshot to the ideal target
    pub fn days(&self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl FromStr for Period {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(HistoryError::InvalidPeriod {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window for ranged history reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRange {
    Week,
    Month,
    All,
}

impl HistoryRange {
    /// Trailing window length; `None` means "the whole index"
    pub fn window_days(&self) -> Option<u32> {
        match self {
            HistoryRange::Week => Some(7),
            HistoryRange::Month => Some(30),
            HistoryRange::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::Week => "week",
            HistoryRange::Month => "month",
            HistoryRange::All => "all",
        }
    }
}

impl FromStr for HistoryRange {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(HistoryRange::Week),
            "month" => Ok(HistoryRange::Month),
            "all" => Ok(HistoryRange::All),
            other => Err(HistoryError::InvalidRange {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_rejects_loose_formats() {
        for bad in ["2026-1-05", "2026/01/05", "20260105", "2026-02-30", "", "2026-01-05T00"] {
            assert!(bad.parse::<CalendarDate>().is_err(), "{bad} should not parse");
        }
        assert_eq!(d("2026-01-05").to_string(), "2026-01-05");
    }

    #[test]
    fn test_order_matches_string_order() {
        let mut dates = vec![d("2026-02-01"), d("2025-12-31"), d("2026-01-10")];
        let mut strings: Vec<String> = dates.iter().map(|x| x.to_string()).collect();
        dates.sort();
        strings.sort();
        let rendered: Vec<String> = dates.iter().map(|x| x.to_string()).collect();
        assert_eq!(rendered, strings);
    }

    #[test]
    fn test_minus_days_crosses_month_and_year() {
        assert_eq!(d("2026-01-03").minus_days(7), d("2025-12-27"));
        assert_eq!(d("2026-03-01").minus_days(1), d("2026-02-28"));
    }

    #[test]
    fn test_trailing_window_is_inclusive_and_ascending() {
        let window = d("2026-01-10").trailing(7);
        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), Some(&d("2026-01-04")));
        assert_eq!(window.last(), Some(&d("2026-01-10")));
        assert!(window.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&d("2026-01-10")).unwrap();
        assert_eq!(json, "\"2026-01-10\"");
        assert!(serde_json::from_str::<CalendarDate>("\"2026-1-10\"").is_err());
    }

    #[test]
    fn test_period_and_range_parse() {
        assert_eq!("week".parse::<Period>().unwrap().days(), 7);
        assert_eq!(Period::default(), Period::Day);
        assert!("year".parse::<Period>().is_err());
        assert_eq!("month".parse::<HistoryRange>().unwrap().window_days(), Some(30));
        assert_eq!(HistoryRange::All.window_days(), None);
        assert!("day".parse::<HistoryRange>().is_err());
    }
}
