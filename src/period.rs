//! Date normalization and period-range resolution.
//!
//! The document store delivers dates in several shapes: ISO 8601
//! strings, plain `YYYY-MM-DD` strings, timestamp wrapper objects
//! (`{"seconds": ..., "nanoseconds": ...}`) and raw epoch numbers.
//! [`DateValue`] normalizes all of them to canonical day/month keys.
//! Normalization is total: an unrecognized shape matches no period
//! rather than raising an error.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// A date as it arrives from the collaborator store.
///
/// Deserialization is deliberately permissive; the variants are tried
/// in order, and anything that fits none of the known shapes lands in
/// `Other` where it is treated as "matches no period".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// An ISO 8601 datetime or a bare `YYYY-MM-DD` day.
    Text(String),
    /// A raw epoch number.  Values at millisecond magnitude are
    /// detected and scaled down.
    Epoch(f64),
    /// A timestamp wrapper object as produced by hosted document
    /// stores (`.seconds` / `.nanoseconds`).
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    /// Anything else.  Never matches a period.
    Other(Value),
}

impl DateValue {
    /// Resolves this value to a naive UTC timestamp, if it has a
    /// recognizable shape.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            DateValue::Text(s) => parse_text(s),
            DateValue::Epoch(raw) => {
                if !raw.is_finite() {
                    return None;
                }
                // Epoch milliseconds are 13 digits for contemporary
                // dates; epoch seconds are 10.
                let seconds = if raw.abs() >= 1e12 { raw / 1000.0 } else { *raw };
                DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.naive_utc())
            }
            DateValue::Timestamp { seconds, nanoseconds } => {
                DateTime::from_timestamp(*seconds, *nanoseconds).map(|dt| dt.naive_utc())
            }
            DateValue::Other(_) => None,
        }
    }

    /// Canonical `YYYY-MM-DD` key for exact-day matches.
    pub fn day_key(&self) -> Option<String> {
        self.timestamp().map(|dt| dt.format("%Y-%m-%d").to_string())
    }

    /// Canonical `YYYY-MM` key for month-bucket matches.
    pub fn month_key(&self) -> Option<String> {
        self.timestamp().map(|dt| dt.format("%Y-%m").to_string())
    }
}

fn parse_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    None
}

/// A validated `YYYY-MM` pay period identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayMonth {
    year: i32,
    month: u32,
}

impl PayMonth {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The `YYYY-MM` key attendance records are bucketed against.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Whether the given date falls inside this pay month.
    pub fn contains(&self, date: &DateValue) -> bool {
        date.month_key().as_deref() == Some(&self.key())
    }
}

impl FromStr for PayMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::InvalidInput(format!("malformed pay month `{s}`, expected YYYY-MM"));
        let (year, month) = s.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(malformed());
        }
        Ok(PayMonth { year, month })
    }
}

impl fmt::Display for PayMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Aggregation period for profit-and-loss reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// Resolves this period and an anchor into an inclusive report
    /// range.  The anchor is a day (`YYYY-MM-DD`) for Daily/Weekly, a
    /// month (`YYYY-MM`) for Monthly and a year (`YYYY`) for Yearly.
    pub fn resolve(&self, anchor: &str) -> Result<ReportRange, EngineError> {
        let malformed = || {
            EngineError::InvalidInput(format!("anchor `{anchor}` is not valid for a {self:?} report"))
        };
        match self {
            Period::Daily => {
                let day = parse_anchor_day(anchor).ok_or_else(malformed)?;
                Ok(ReportRange::full_days(day, day))
            }
            Period::Weekly => {
                // Weeks start on Monday; a Sunday anchor belongs to
                // the week that began the previous Monday.
                let day = parse_anchor_day(anchor).ok_or_else(malformed)?;
                let back = day.weekday().num_days_from_monday() as i64;
                let start = day - Duration::days(back);
                Ok(ReportRange::full_days(start, start + Duration::days(6)))
            }
            Period::Monthly => {
                let month: PayMonth = anchor.parse().map_err(|_| malformed())?;
                let first = NaiveDate::from_ymd_opt(month.year(), month.month(), 1).ok_or_else(malformed)?;
                Ok(ReportRange::full_days(first, last_day_of_month(first)))
            }
            Period::Yearly => {
                let year: i32 = anchor.trim().parse().map_err(|_| malformed())?;
                let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(malformed)?;
                let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(malformed)?;
                Ok(ReportRange::full_days(first, last))
            }
        }
    }
}

fn parse_anchor_day(anchor: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(anchor.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| DateValue::Text(anchor.to_string()).timestamp().map(|dt| dt.date()))
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    // First of the following month, stepped back one day.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|d| d - Duration::days(1))
        .unwrap_or(first)
}

/// An inclusive `[start, end]` reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportRange {
    /// Builds a range spanning whole days: `start 00:00:00` through
    /// `end 23:59:59.999...`.
    pub fn full_days(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveTime::MIN);
        ReportRange {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(end_of_day),
        }
    }

    /// Inclusive containment at both bounds.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Whether a store-shaped date falls inside the range.  Dates
    /// that cannot be read never match.
    pub fn contains_value(&self, date: &DateValue) -> bool {
        date.timestamp().map(|ts| self.contains(ts)).unwrap_or(false)
    }
}
