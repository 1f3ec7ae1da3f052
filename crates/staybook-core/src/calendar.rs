//! # Calendar Module
//!
//! Parses and validates canonical `YYYY-MM-DD` date strings.
//!
//! ## Validation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "2024-02-29"                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Shape: 10 bytes, dashes at 4 and 7, ASCII digits elsewhere            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Month in 1..=12                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Day in 1..=days_in_month(year, month)   (Feb: 29 on leap years)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CalendarDate { year: 2024, month: 2, day: 29 }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No clock and no timezone are involved: validity is a function of the
//! string alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Days per month in a common year, January first.
const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Length of a canonical date string.
const DATE_LEN: usize = 10;

// =============================================================================
// Calendar Date
// =============================================================================

/// A validated calendar date.
///
/// Only constructible through [`validate`], so every value names a real day.
/// Ordering is calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate {
    year: u16,
    month: u8,
    day: u8,
}

impl CalendarDate {
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year
    }

    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Converts to a chrono date.
    ///
    /// Returns `None` only for years chrono cannot represent, which no
    /// four-digit year is.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }

    /// Builds a date from a chrono date, if the year fits four digits.
    pub fn from_naive_date(date: NaiveDate) -> Option<Self> {
        use chrono::Datelike;

        let year = u16::try_from(date.year()).ok().filter(|y| *y <= 9999)?;
        Some(CalendarDate {
            year,
            month: date.month() as u8,
            day: date.day() as u8,
        })
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

// =============================================================================
// Calendar Arithmetic
// =============================================================================

/// Gregorian leap rule: divisible by 4, and not by 100 unless also by 400.
///
/// ## Example
/// ```rust
/// use staybook_core::calendar::is_leap_year;
///
/// assert!(is_leap_year(2024));
/// assert!(is_leap_year(2000));
/// assert!(!is_leap_year(1900));
/// assert!(!is_leap_year(2021));
/// ```
pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-based) of `year`, or `None` for a bad month.
pub fn days_in_month(year: u16, month: u8) -> Option<u8> {
    let index = usize::from(month).checked_sub(1)?;
    let days = *DAYS_IN_MONTH.get(index)?;
    if month == 2 && is_leap_year(year) {
        Some(29)
    } else {
        Some(days)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a date string and returns the parsed date.
///
/// ## Rules
/// - Exactly `DDDD-DD-DD`: ten ASCII bytes, no sign, no whitespace
/// - Month between 1 and 12
/// - Day between 1 and the month length, February honouring the leap rule
///
/// ## Example
/// ```rust
/// use staybook_core::calendar::validate;
///
/// assert!(validate("2024-02-29").is_ok());
/// assert!(validate("2021-02-29").is_err());
/// assert!(validate("2021-10-1").is_err());
/// ```
pub fn validate(s: &str) -> LedgerResult<CalendarDate> {
    let bytes = s.as_bytes();
    if bytes.len() != DATE_LEN || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(LedgerError::invalid_date(s));
    }

    let year = parse_digits(&bytes[0..4]).ok_or_else(|| LedgerError::invalid_date(s))?;
    let month = parse_digits(&bytes[5..7]).ok_or_else(|| LedgerError::invalid_date(s))?;
    let day = parse_digits(&bytes[8..10]).ok_or_else(|| LedgerError::invalid_date(s))?;

    // Four digits always fit u16, two digits always fit u8.
    let year = year as u16;
    let month = month as u8;
    let day = day as u8;

    let max_day = days_in_month(year, month).ok_or_else(|| LedgerError::invalid_date(s))?;
    if day == 0 || day > max_day {
        return Err(LedgerError::invalid_date(s));
    }

    Ok(CalendarDate { year, month, day })
}

/// Parses a run of ASCII digits. Rejects anything else, including signs.
fn parse_digits(field: &[u8]) -> Option<u32> {
    field.iter().try_fold(0u32, |acc, b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

// =============================================================================
// Stay Expansion (client-side helper)
// =============================================================================

/// Expands an inclusive stay into every date from `check_in` to `check_out`.
///
/// Booking clients submit one entry per night. Returns an empty list when
/// `check_out` is before `check_in`.
///
/// ## Example
/// ```rust
/// use staybook_core::calendar::{date_range, validate};
///
/// let nights = date_range(validate("2024-02-28").unwrap(), validate("2024-03-01").unwrap());
/// let rendered: Vec<String> = nights.iter().map(|d| d.to_string()).collect();
/// assert_eq!(rendered, ["2024-02-28", "2024-02-29", "2024-03-01"]);
/// ```
pub fn date_range(check_in: CalendarDate, check_out: CalendarDate) -> Vec<CalendarDate> {
    let (Some(start), Some(end)) = (check_in.to_naive_date(), check_out.to_naive_date()) else {
        return Vec::new();
    };

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter_map(CalendarDate::from_naive_date)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
