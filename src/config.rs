use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{
    CalendarError, DEFAULT_FISCAL_YEAR, DEFAULT_START_DAY, DEFAULT_START_MONTH, DEFAULT_START_YEAR,
    FISCAL_YEAR_DAYS, FiscalYear, MonthLengths, types::days_between,
};

/// One anchor record of the fiscal year history.
///
/// Serialized with the keys `FISCAL_YEAR`, `START_DATE` (an object with `YEAR`,
/// `MONTH` and `DAY`) and `MONTH_LENGTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalYearConfig {
    #[serde(rename = "FISCAL_YEAR")]
    pub fiscal_year:   i32,
    #[serde(rename = "START_DATE", with = "wire_date")]
    pub start_date:    NaiveDate,
    #[serde(rename = "MONTH_LENGTH")]
    pub month_lengths: MonthLengths,
}

impl FiscalYearConfig {
    pub const fn new(fiscal_year: i32, start_date: NaiveDate, month_lengths: MonthLengths) -> Self {
        Self {
            fiscal_year,
            start_date,
            month_lengths,
        }
    }

    /// Length of this fiscal year in days
    pub fn total_days(&self) -> u32 {
        self.month_lengths.total_days()
    }

    /// Builds the calendar geometry this record describes.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` if the year runs past the last
    /// representable date.
    pub fn to_fiscal_year(&self) -> Result<FiscalYear, CalendarError> {
        FiscalYear::new(self.fiscal_year, self.start_date, &self.month_lengths)
    }
}

/// Fiscal year 2018, starting 2018-02-04, with the standard pattern.
impl Default for FiscalYearConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FISCAL_YEAR, DEFAULT_START, MonthLengths::STANDARD)
    }
}

const DEFAULT_START: NaiveDate =
    match NaiveDate::from_ymd_opt(DEFAULT_START_YEAR, DEFAULT_START_MONTH, DEFAULT_START_DAY) {
        Some(date) => date,
        None => panic!("default fiscal year start is not a calendar date"),
    };

mod wire_date {
    use chrono::{Datelike, NaiveDate};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::calendar_date;

    #[derive(Serialize, Deserialize)]
    struct WireDate {
        #[serde(rename = "YEAR")]
        year:  i32,
        #[serde(rename = "MONTH")]
        month: u32,
        #[serde(rename = "DAY")]
        day:   u32,
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WireDate {
            year:  date.year(),
            month: date.month(),
            day:   date.day(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = WireDate::deserialize(deserializer)?;
        calendar_date(wire.year, wire.month, wire.day).map_err(serde::de::Error::custom)
    }
}

/// Error type for fiscal year history validation and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The history has no records to project from.
    #[error("Fiscal year history is empty")]
    EmptyHistory,

    /// Two records claim the same fiscal year.
    #[error("Fiscal year {0} appears more than once in the history")]
    DuplicateFiscalYear(i32),

    /// A later fiscal year starts before an earlier one has ended.
    #[error("Fiscal year {later} starts before fiscal year {earlier} ends")]
    OverlappingYears { earlier: i32, later: i32 },

    /// A record older than the newest recorded year was offered.
    #[error("Cannot add a past fiscal year: {year} is older than the latest recorded year {latest}")]
    PastFiscalYear { year: i32, latest: i32 },
}

/// The fiscal year history: a validated, non-empty list of anchor records.
///
/// Records are kept newest first, the order in which they are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FiscalYearConfig>", into = "Vec<FiscalYearConfig>")]
pub struct ConfigHistory {
    records: Vec<FiscalYearConfig>,
}

impl ConfigHistory {
    /// Creates a history from records in any order.
    ///
    /// # Errors
    /// Returns `ConfigError` if the list is empty, repeats a fiscal year, or
    /// has a fiscal year starting before the previous recorded year, and any
    /// projected years between them, have ended.
    pub fn new(mut records: Vec<FiscalYearConfig>) -> Result<Self, ConfigError> {
        records.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
        Self::validate(&records)?;
        Ok(Self { records })
    }

    /// Expects `records` sorted newest first.
    fn validate(records: &[FiscalYearConfig]) -> Result<(), ConfigError> {
        if records.is_empty() {
            return Err(ConfigError::EmptyHistory);
        }

        for pair in records.windows(2) {
            let (newer, older) = (&pair[0], &pair[1]);
            if newer.fiscal_year == older.fiscal_year {
                return Err(ConfigError::DuplicateFiscalYear(newer.fiscal_year));
            }
            // Unrecorded years in between are projected at 364 days each
            let skipped = i64::from(newer.fiscal_year) - i64::from(older.fiscal_year) - 1;
            let earliest_start = i64::from(older.total_days()) + skipped * i64::from(FISCAL_YEAR_DAYS);
            if days_between(older.start_date, newer.start_date) < earliest_start {
                return Err(ConfigError::OverlappingYears {
                    earlier: older.fiscal_year,
                    later:   newer.fiscal_year,
                });
            }
        }

        Ok(())
    }

    /// The record with the highest fiscal year
    pub fn latest(&self) -> &FiscalYearConfig {
        // non-empty by construction
        &self.records[0]
    }

    /// The record with the lowest fiscal year
    pub fn earliest(&self) -> &FiscalYearConfig {
        &self.records[self.records.len() - 1]
    }

    /// The record for exactly `fiscal_year`, if one was stored
    pub fn find(&self, fiscal_year: i32) -> Option<&FiscalYearConfig> {
        self.records.iter().find(|record| record.fiscal_year == fiscal_year)
    }

    pub fn records(&self) -> &[FiscalYearConfig] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FiscalYearConfig> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a validated history.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds a new fiscal year or replaces the newest one.
    ///
    /// A record older than [`ConfigHistory::latest`] is rejected. A record for
    /// the latest year overwrites its start date and month lengths. A newer
    /// record becomes the new latest entry. On error the history is unchanged.
    ///
    /// # Errors
    /// Returns `ConfigError::PastFiscalYear` for an older record, or
    /// `ConfigError::OverlappingYears` if the new start date collides with the
    /// previous recorded year.
    pub fn add_or_update(&mut self, record: FiscalYearConfig) -> Result<(), ConfigError> {
        let latest = self.latest().fiscal_year;
        let mut records = self.records.clone();

        match record.fiscal_year.cmp(&latest) {
            Ordering::Less => {
                return Err(ConfigError::PastFiscalYear {
                    year: record.fiscal_year,
                    latest,
                });
            },
            Ordering::Equal => records[0] = record,
            Ordering::Greater => records.insert(0, record),
        }

        Self::validate(&records)?;
        self.records = records;
        Ok(())
    }
}

/// The bootstrap history: a single record for fiscal year 2018.
impl Default for ConfigHistory {
    fn default() -> Self {
        Self {
            records: vec![FiscalYearConfig::default()],
        }
    }
}

impl TryFrom<Vec<FiscalYearConfig>> for ConfigHistory {
    type Error = ConfigError;

    fn try_from(records: Vec<FiscalYearConfig>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<ConfigHistory> for Vec<FiscalYearConfig> {
    fn from(history: ConfigHistory) -> Self {
        history.records
    }
}

impl<'a> IntoIterator for &'a ConfigHistory {
    type Item = &'a FiscalYearConfig;
    type IntoIter = std::slice::Iter<'a, FiscalYearConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
