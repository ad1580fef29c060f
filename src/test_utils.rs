//! Test helpers shared across unit test modules.

use chrono::NaiveDate;

use crate::{
    ConfigHistory, FiscalMonthNumber, FiscalWeekNumber, FiscalYear, FiscalYearConfig, MonthLengths,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("invalid test date")
}

pub fn month_number(n: u8) -> FiscalMonthNumber {
    FiscalMonthNumber::new(n).expect("invalid test month number")
}

pub fn week_number(n: u8) -> FiscalWeekNumber {
    FiscalWeekNumber::new(n).expect("invalid test week number")
}

/// A 4-4-5 record for `fiscal_year` starting on `start`.
pub fn record(fiscal_year: i32, start: NaiveDate) -> FiscalYearConfig {
    FiscalYearConfig::new(fiscal_year, start, MonthLengths::STANDARD)
}

pub fn history(records: Vec<FiscalYearConfig>) -> ConfigHistory {
    ConfigHistory::new(records).expect("invalid test history")
}

/// Fiscal year 2018 as bootstrapped: starts 2018-02-04, standard pattern.
pub fn fy2018() -> FiscalYear {
    FiscalYear::new(2018, date(2018, 2, 4), &MonthLengths::STANDARD).expect("fiscal year 2018")
}
