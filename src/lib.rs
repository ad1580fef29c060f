mod calendar;
mod clock;
mod config;
mod consts;
mod prelude;
mod resolver;
mod store;
mod types;

#[cfg(test)]
mod test_utils;

pub use calendar::{FiscalMonth, FiscalWeek, FiscalYear};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ConfigHistory, FiscalYearConfig};
pub use consts::*;
pub use resolver::{FiscalCalendar, FiscalError};
pub use store::{ConfigStore, JsonFileStore, MemoryStore, StoreError};
pub use types::{FiscalMonthNumber, FiscalWeekNumber, MonthLengths};

use crate::prelude::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Position of a calendar date in the fiscal calendar.
///
/// Ordering follows the calendar: year first, then month, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "FY{}-M{:02}-W{}", fiscal_year, "month.get()", "week.get()")]
pub struct FiscalCoordinate {
    pub fiscal_year: i32,
    pub month:       FiscalMonthNumber,
    pub week:        FiscalWeekNumber,
}

impl FiscalCoordinate {
    pub const fn new(fiscal_year: i32, month: FiscalMonthNumber, week: FiscalWeekNumber) -> Self {
        Self {
            fiscal_year,
            month,
            week,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CalendarError {
    #[display(fmt = "Invalid fiscal month: {} (must be 1-{})", "_0", MAX_FISCAL_MONTH)]
    InvalidMonthNumber(u8),
    #[display(fmt = "Invalid fiscal week: {} (must be 1-{})", "_0", MAX_WEEKS_IN_MONTH)]
    InvalidWeekNumber(u8),
    #[display(fmt = "Invalid month count: {} (must be {})", "_0", MONTHS_IN_FISCAL_YEAR)]
    InvalidMonthCount(usize),
    #[display(
        fmt = "Invalid length {} for fiscal month {} (must be {} or {})",
        days,
        month,
        SHORT_MONTH_DAYS,
        LONG_MONTH_DAYS
    )]
    InvalidMonthLength { month: u8, days: u16 },
    #[display(fmt = "Invalid fiscal year length: {} days (must be {})", "_0", FISCAL_YEAR_DAYS)]
    InvalidYearLength(u32),
    #[display(fmt = "Invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[display(fmt = "Date out of range: {date} shifted by {days} days")]
    DateOverflow { date: NaiveDate, days: i64 },
}

impl std::error::Error for CalendarError {}
