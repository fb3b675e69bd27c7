//! Reporting periods.
//!
//! A period is a calendar month, selected by its English name. Resolution
//! happens up front so that a bad label is rejected before any store
//! access takes place.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WasteError};

/// Month names in calendar order (January = 1).
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Map a month name to its number (1..=12). Case-insensitive, surrounding
/// whitespace is ignored.
pub fn month_number(label: &str) -> Option<u32> {
    let label = label.trim();
    MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(label))
        .map(|idx| idx as u32 + 1)
}

/// A resolved calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

/// Half-open UTC time range `[start, end)` covered by a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodRange {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }
}

impl Period {
    /// Resolve a month label (and optional year) to a concrete period.
    ///
    /// When `year` is `None` the year of `now` is used.
    pub fn resolve(label: &str, year: Option<i32>, now: DateTime<Utc>) -> Result<Self> {
        let month = month_number(label).ok_or_else(|| {
            WasteError::validation(format!(
                "Invalid month name '{}'. Please use a valid month name (e.g., January, February).",
                label.trim()
            ))
        })?;
        let period = Self {
            year: year.unwrap_or_else(|| now.year()),
            month,
        };
        // Reject years chrono can't represent up front.
        period.range()?;
        Ok(period)
    }

    /// The calendar month containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    /// English month name, e.g. `"March"`.
    pub fn label(&self) -> &'static str {
        MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("Unknown")
    }

    pub fn range(&self) -> Result<PeriodRange> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let start = month_start(self.year, self.month)?;
        let end = month_start(next_year, next_month)?;
        Ok(PeriodRange { start, end })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label(), self.year)
    }
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| WasteError::validation(format!("Period {}-{:02} is out of range", year, month)))
}
