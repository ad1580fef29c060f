use std::fmt;

use chrono::NaiveDate;

use crate::{
    CalendarError, Clock, DAYS_IN_WEEK, FISCAL_YEAR_DAYS, FiscalMonthNumber, FiscalWeekNumber,
    LONG_MONTH_DAYS, MONTHS_IN_FISCAL_YEAR, MonthLengths, SHORT_MONTH_DAYS,
    prelude::*,
    types::{shift, within},
};

/// Seven consecutive days of a fiscal month (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "week {number}: {start} to {end}")]
pub struct FiscalWeek {
    number: FiscalWeekNumber,
    start:  NaiveDate,
    end:    NaiveDate,
}

impl FiscalWeek {
    /// Creates the week that begins on `start`.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` if the week runs past the last
    /// representable date.
    pub fn new(number: FiscalWeekNumber, start: NaiveDate) -> Result<Self, CalendarError> {
        let end = shift(start, i64::from(DAYS_IN_WEEK) - 1)?;
        Ok(Self { number, start, end })
    }

    pub const fn number(&self) -> FiscalWeekNumber {
        self.number
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Checks if the week contains a given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        within(date, self.start, self.end)
    }
}

/// A 28- or 35-day fiscal month (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "month {number}: {start} to {end}")]
pub struct FiscalMonth {
    number: FiscalMonthNumber,
    start:  NaiveDate,
    end:    NaiveDate,
    length: u16,
}

impl FiscalMonth {
    /// Creates a month of `length` days beginning on `start`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonthLength` unless `length` is 28 or 35,
    /// and `CalendarError::DateOverflow` if the month runs past the last
    /// representable date.
    pub fn new(number: FiscalMonthNumber, start: NaiveDate, length: u16) -> Result<Self, CalendarError> {
        if length != SHORT_MONTH_DAYS && length != LONG_MONTH_DAYS {
            return Err(CalendarError::InvalidMonthLength {
                month: number.get(),
                days:  length,
            });
        }
        let end = shift(start, i64::from(length) - 1)?;
        Ok(Self {
            number,
            start,
            end,
            length,
        })
    }

    pub const fn number(&self) -> FiscalMonthNumber {
        self.number
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Days from `start` through `end`
    pub const fn length(&self) -> u16 {
        self.length
    }

    /// Checks if the month contains a given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        within(date, self.start, self.end)
    }

    /// Week `n`, starting `7 * (n - 1)` days after the month starts.
    ///
    /// The week is not clipped to the month: week 5 of a 28-day month lies
    /// entirely in the following month.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` near the end of the representable
    /// date range.
    pub fn week(&self, n: FiscalWeekNumber) -> Result<FiscalWeek, CalendarError> {
        let offset = i64::from(DAYS_IN_WEEK) * (i64::from(n.get()) - 1);
        FiscalWeek::new(n, shift(self.start, offset)?)
    }

    /// The whole weeks this month spans: four or five.
    ///
    /// # Errors
    /// See [`FiscalMonth::week`].
    pub fn weeks(&self) -> Result<Vec<FiscalWeek>, CalendarError> {
        FiscalWeekNumber::all()
            .take(usize::from(self.length / DAYS_IN_WEEK))
            .map(|n| self.week(n))
            .collect()
    }

    /// First of weeks 1 through 5 containing `date`, if any.
    ///
    /// # Errors
    /// See [`FiscalMonth::week`].
    pub fn week_of_date(&self, date: NaiveDate) -> Result<Option<FiscalWeek>, CalendarError> {
        for n in FiscalWeekNumber::all() {
            let week = self.week(n)?;
            if week.contains(date) {
                return Ok(Some(week));
            }
        }
        Ok(None)
    }
}

/// A 364-day fiscal year partitioned into twelve fiscal months.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FiscalYear {
    year:          i32,
    start:         NaiveDate,
    end:           NaiveDate,
    month_lengths: MonthLengths,
    months:        Vec<FiscalMonth>,
}

impl FiscalYear {
    /// Lays out the twelve months of fiscal year `year` back to back from `start`.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` if the year runs past the last
    /// representable date.
    pub fn new(year: i32, start: NaiveDate, month_lengths: &MonthLengths) -> Result<Self, CalendarError> {
        let end = shift(start, i64::from(FISCAL_YEAR_DAYS) - 1)?;

        let mut months = Vec::with_capacity(MONTHS_IN_FISCAL_YEAR);
        let mut month_start = start;
        for number in FiscalMonthNumber::all() {
            let length = month_lengths.of(number);
            months.push(FiscalMonth::new(number, month_start, length)?);
            month_start = shift(month_start, i64::from(length))?;
        }

        Ok(Self {
            year,
            start,
            end,
            month_lengths: *month_lengths,
            months,
        })
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the year (inclusive)
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub const fn month_lengths(&self) -> MonthLengths {
        self.month_lengths
    }

    pub fn months(&self) -> &[FiscalMonth] {
        &self.months
    }

    /// Month `n` of this year
    pub fn month(&self, n: FiscalMonthNumber) -> &FiscalMonth {
        &self.months[n.index()]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        within(date, self.start, self.end)
    }

    /// The month containing `date`, or `None` if the date lies outside this year.
    pub fn month_of_date(&self, date: NaiveDate) -> Option<&FiscalMonth> {
        self.months.iter().find(|month| month.contains(date))
    }

    /// The month containing the clock's current date.
    pub fn current_fiscal_month(&self, clock: &impl Clock) -> Option<&FiscalMonth> {
        self.month_of_date(clock.today())
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FY{}: {} to {}", self.year, self.start, self.end)?;
        for month in &self.months {
            writeln!(f, "  {month}")?;
        }
        Ok(())
    }
}
