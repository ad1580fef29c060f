use crate::CalendarError;
use crate::consts::{
    FISCAL_YEAR_DAYS, LONG_MONTH_DAYS, MAX_FISCAL_MONTH, MAX_WEEKS_IN_MONTH, MONTHS_IN_FISCAL_YEAR,
    SHORT_MONTH_DAYS, STANDARD_MONTH_LENGTHS,
};
use crate::prelude::*;
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// A fiscal month number guaranteed to be in the range `1..=12`
/// Uses `NonZeroU8` internally, so 0 is not a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FiscalMonthNumber(NonZeroU8);

impl FiscalMonthNumber {
    /// Creates a new month number, validating that it's non-zero and <= 12
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonthNumber` if the value is 0 or > 12.
    pub fn new(value: u8) -> Result<Self, CalendarError> {
        let non_zero = NonZeroU8::new(value).ok_or(CalendarError::InvalidMonthNumber(value))?;
        if value > MAX_FISCAL_MONTH {
            return Err(CalendarError::InvalidMonthNumber(value));
        }
        Ok(Self(non_zero))
    }

    /// Returns the month number as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// All twelve month numbers in order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_FISCAL_MONTH).filter_map(|n| Self::new(n).ok())
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl TryFrom<u8> for FiscalMonthNumber {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiscalMonthNumber> for u8 {
    fn from(month: FiscalMonthNumber) -> Self {
        month.0.get()
    }
}

impl fmt::Display for FiscalMonthNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A week number within a fiscal month, in the range `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FiscalWeekNumber(NonZeroU8);

impl FiscalWeekNumber {
    /// Creates a new week number, validating that it's non-zero and <= 5
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidWeekNumber` if the value is 0 or > 5.
    pub fn new(value: u8) -> Result<Self, CalendarError> {
        let non_zero = NonZeroU8::new(value).ok_or(CalendarError::InvalidWeekNumber(value))?;
        if value > MAX_WEEKS_IN_MONTH {
            return Err(CalendarError::InvalidWeekNumber(value));
        }
        Ok(Self(non_zero))
    }

    /// Returns the week number as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Week numbers 1 through 5 in order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_WEEKS_IN_MONTH).filter_map(|n| Self::new(n).ok())
    }
}

impl TryFrom<u8> for FiscalWeekNumber {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiscalWeekNumber> for u8 {
    fn from(week: FiscalWeekNumber) -> Self {
        week.0.get()
    }
}

impl fmt::Display for FiscalWeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Day counts of the twelve fiscal months of one fiscal year.
///
/// Every entry is 28 or 35 and the entries sum to 364, so a value of this
/// type always describes a well-formed fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deref, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct MonthLengths([u16; MONTHS_IN_FISCAL_YEAR]);

impl MonthLengths {
    /// The 4-4-5 pattern
    pub const STANDARD: Self = Self(STANDARD_MONTH_LENGTHS);

    /// Creates month lengths, validating each month and the year total
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonthLength` if a month is neither 28 nor
    /// 35 days, or `CalendarError::InvalidYearLength` if the total is not 364.
    pub fn new(lengths: [u16; MONTHS_IN_FISCAL_YEAR]) -> Result<Self, CalendarError> {
        for (number, &days) in FiscalMonthNumber::all().zip(lengths.iter()) {
            if days != SHORT_MONTH_DAYS && days != LONG_MONTH_DAYS {
                return Err(CalendarError::InvalidMonthLength {
                    month: number.get(),
                    days,
                });
            }
        }

        let total: u32 = lengths.iter().copied().map(u32::from).sum();
        if total != FISCAL_YEAR_DAYS {
            return Err(CalendarError::InvalidYearLength(total));
        }

        Ok(Self(lengths))
    }

    /// Length in days of the given month
    #[inline]
    pub const fn of(&self, month: FiscalMonthNumber) -> u16 {
        self.0[month.index()]
    }

    /// Sum of all twelve months
    pub fn total_days(&self) -> u32 {
        self.0.iter().copied().map(u32::from).sum()
    }
}

impl Default for MonthLengths {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TryFrom<Vec<u16>> for MonthLengths {
    type Error = CalendarError;

    fn try_from(value: Vec<u16>) -> Result<Self, Self::Error> {
        let lengths: [u16; MONTHS_IN_FISCAL_YEAR] = value
            .try_into()
            .map_err(|rejected: Vec<u16>| CalendarError::InvalidMonthCount(rejected.len()))?;
        Self::new(lengths)
    }
}

impl From<MonthLengths> for Vec<u16> {
    fn from(lengths: MonthLengths) -> Self {
        lengths.0.to_vec()
    }
}

// Helper functions

/// Builds a calendar date, reporting impossible dates as `InvalidDate`.
pub(crate) fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalendarError::InvalidDate { year, month, day })
}

/// Moves `date` by a signed number of days.
pub(crate) fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, CalendarError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(CalendarError::DateOverflow { date, days })
}

/// Inclusive range test on calendar dates.
#[inline]
pub(crate) fn within(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

/// Whole days from `from` to `to`, negative when `to` is earlier.
#[inline]
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
