//! Calendar-day types for event queries.
//!
//! This module provides [`DateRange`] for inclusive day-level query windows,
//! and [`MonthRef`] for validated year+month references used in grid
//! construction.
//!
//! All day-granularity comparisons in calgrid happen on **UTC calendar days**:
//! a timestamp belongs to the day obtained by dropping its time-of-day in UTC.
//! The matching and grid code never compares instants directly.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// An inclusive day-level query window `[from, to]`.
///
/// The invariant `from <= to` is enforced at construction; a `DateRange`
/// that exists is always valid and downstream code never re-checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> CoreResult<Self> {
        if from > to {
            return Err(CoreError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Creates a degenerate range covering a single day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// The first day of the window (inclusive).
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// The last day of the window (inclusive).
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Checks if a day falls within this window (both ends inclusive).
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Number of days covered, counting both endpoints.
    pub fn day_count(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

/// A validated year+month reference.
///
/// Construction rejects months outside `1..=12` (and years chrono cannot
/// represent); an out-of-range month is never silently normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    /// Creates a new month reference.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMonth`] if `month` is outside `1..=12`
    /// or the year is outside the representable calendar range.
    pub fn new(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CoreError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// Returns the month containing the given day.
    pub fn containing(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated month")
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month())
            .expect("validated month")
    }

    /// Number of days in the month, accounting for leap years.
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => {
                if self.is_leap_year() {
                    29
                } else {
                    28
                }
            }
        }
    }

    /// Returns true if the year is a leap year.
    pub fn is_leap_year(&self) -> bool {
        self.year % 4 == 0 && (self.year % 100 != 0 || self.year % 400 == 0)
    }

    /// Number of blank cells before day 1 on a Sunday-start week grid.
    pub fn leading_blanks(&self) -> usize {
        self.first_day().weekday().num_days_from_sunday() as usize
    }

    /// The range covering the whole month.
    pub fn to_range(&self) -> DateRange {
        DateRange {
            from: self.first_day(),
            to: self.last_day(),
        }
    }

    /// The previous calendar month.
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The next calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
