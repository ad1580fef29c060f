//! Projection of fiscal-year boundaries from a sparse history of anchor records.
//!
//! A year with its own record uses it verbatim. Any other year is projected
//! from the nearest record at or before it, advancing one fiscal year per 364
//! days. Years older than every record are projected backwards from the oldest.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    CalendarError, Clock, ConfigError, ConfigHistory, ConfigStore, FISCAL_YEAR_DAYS,
    FiscalCoordinate, FiscalMonth, FiscalMonthNumber, FiscalWeekNumber, FiscalYear,
    FiscalYearConfig, MonthLengths, StoreError, SystemClock,
    types::{days_between, shift},
};

/// Error type for fiscal calendar queries and history updates.
#[derive(Debug, thiserror::Error)]
pub enum FiscalError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The resolved fiscal year does not cover the date.
    #[error("{date} does not fall inside fiscal year {fiscal_year}")]
    DateNotInFiscalYear { date: NaiveDate, fiscal_year: i32 },

    /// None of weeks 1 through 5 of the month covers the date.
    #[error("No week of fiscal month {month} contains {date}")]
    NoWeekContains { date: NaiveDate, month: FiscalMonthNumber },
}

impl ConfigHistory {
    /// Newest record at or before `fiscal_year`, else the oldest record.
    fn anchor_for_year(&self, fiscal_year: i32) -> &FiscalYearConfig {
        self.iter()
            .find(|record| record.fiscal_year <= fiscal_year)
            .unwrap_or_else(|| self.earliest())
    }

    /// Newest record starting on or before `date` (else the oldest record),
    /// paired with the next newer record if there is one.
    fn anchor_for_date(&self, date: NaiveDate) -> (&FiscalYearConfig, Option<&FiscalYearConfig>) {
        let records = self.records();
        match records.iter().position(|record| record.start_date <= date) {
            Some(index) => (&records[index], index.checked_sub(1).map(|newer| &records[newer])),
            None => (self.earliest(), None),
        }
    }

    /// Month lengths recorded for `fiscal_year`, or the 4-4-5 pattern.
    pub fn month_lengths_of_fiscal_year(&self, fiscal_year: i32) -> MonthLengths {
        self.find(fiscal_year)
            .map_or(MonthLengths::STANDARD, |record| record.month_lengths)
    }

    /// Calendar date on which `fiscal_year` begins.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` if the projection leaves the
    /// representable date range.
    pub fn start_of_fiscal_year(&self, fiscal_year: i32) -> Result<NaiveDate, CalendarError> {
        if let Some(record) = self.find(fiscal_year) {
            return Ok(record.start_date);
        }

        let anchor = self.anchor_for_year(fiscal_year);
        let years_ahead = i64::from(fiscal_year) - i64::from(anchor.fiscal_year);
        let days = if years_ahead > 0 {
            i64::from(anchor.total_days()) + (years_ahead - 1) * i64::from(FISCAL_YEAR_DAYS)
        } else {
            years_ahead * i64::from(FISCAL_YEAR_DAYS)
        };

        let start = shift(anchor.start_date, days)?;
        debug!(fiscal_year, anchor = anchor.fiscal_year, %start, "projected fiscal year start");
        Ok(start)
    }

    /// Fiscal year whose span covers `date`.
    ///
    /// Never projects past the next recorded year, so a date in a gap left by
    /// a drifting start date resolves to the year before that record.
    pub fn fiscal_year_of_date(&self, date: NaiveDate) -> i32 {
        let (anchor, newer) = self.anchor_for_date(date);
        let elapsed = days_between(anchor.start_date, date) + i64::from(anchor.total_days());
        let years_since = elapsed.div_euclid(i64::from(FISCAL_YEAR_DAYS)) - 1;

        // NaiveDate spans fewer than 2^20 years, so this always fits.
        #[allow(clippy::cast_possible_truncation)]
        let projected = anchor.fiscal_year.saturating_add(years_since as i32);

        newer.map_or(projected, |next| projected.min(next.fiscal_year - 1))
    }

    /// Full calendar geometry of `fiscal_year`.
    ///
    /// # Errors
    /// Returns `CalendarError::DateOverflow` if the year leaves the
    /// representable date range.
    pub fn fiscal_year(&self, fiscal_year: i32) -> Result<FiscalYear, CalendarError> {
        let start = self.start_of_fiscal_year(fiscal_year)?;
        FiscalYear::new(fiscal_year, start, &self.month_lengths_of_fiscal_year(fiscal_year))
    }

    /// Month and week of `fiscal_year` containing `date`.
    ///
    /// # Errors
    /// Returns `FiscalError::DateNotInFiscalYear` if the date lies outside the
    /// year, or `FiscalError::NoWeekContains` if no week 1-5 covers it.
    pub fn locate_in_fiscal_year(
        &self,
        fiscal_year: i32,
        date: NaiveDate,
    ) -> Result<(FiscalMonthNumber, FiscalWeekNumber), FiscalError> {
        let year = self.fiscal_year(fiscal_year)?;
        let month = year
            .month_of_date(date)
            .ok_or(FiscalError::DateNotInFiscalYear { date, fiscal_year })?;
        let week = month.week_of_date(date)?.ok_or(FiscalError::NoWeekContains {
            date,
            month: month.number(),
        })?;
        Ok((month.number(), week.number()))
    }

    /// Fiscal year, month and week of `date`.
    ///
    /// # Errors
    /// Returns `FiscalError::DateNotInFiscalYear` when `date` falls in a gap
    /// between a projected year and the next recorded one.
    pub fn coordinate_of(&self, date: NaiveDate) -> Result<FiscalCoordinate, FiscalError> {
        let fiscal_year = self.fiscal_year_of_date(date);
        let (month, week) = self.locate_in_fiscal_year(fiscal_year, date)?;
        Ok(FiscalCoordinate::new(fiscal_year, month, week))
    }
}

/// Fiscal calendar queries backed by a history store and a clock.
///
/// The history is loaded from the store on every call, so changes made
/// through another handle to the same store are picked up.
#[derive(Debug)]
pub struct FiscalCalendar<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: ConfigStore> FiscalCalendar<S, SystemClock> {
    pub const fn with_system_clock(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: ConfigStore, C: Clock> FiscalCalendar<S, C> {
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// # Errors
    /// Returns `FiscalError::Store` if the history cannot be loaded.
    pub fn history(&self) -> Result<ConfigHistory, FiscalError> {
        Ok(self.store.load()?)
    }

    /// The fiscal year containing today.
    ///
    /// # Errors
    /// Returns `FiscalError::Store` if the history cannot be loaded.
    pub fn current_fiscal_year(&self) -> Result<i32, FiscalError> {
        let today = self.clock.today();
        let fiscal_year = self.history()?.fiscal_year_of_date(today);
        debug!(%today, fiscal_year, "resolved current fiscal year");
        Ok(fiscal_year)
    }

    /// # Errors
    /// Returns `FiscalError` if the history cannot be loaded or the
    /// projection overflows.
    pub fn start_of_fiscal_year(&self, fiscal_year: i32) -> Result<NaiveDate, FiscalError> {
        Ok(self.history()?.start_of_fiscal_year(fiscal_year)?)
    }

    /// # Errors
    /// Returns `FiscalError::Store` if the history cannot be loaded.
    pub fn month_lengths_of_fiscal_year(&self, fiscal_year: i32) -> Result<MonthLengths, FiscalError> {
        Ok(self.history()?.month_lengths_of_fiscal_year(fiscal_year))
    }

    /// # Errors
    /// Returns `FiscalError` if the history cannot be loaded or the year
    /// overflows.
    pub fn fiscal_year(&self, fiscal_year: i32) -> Result<FiscalYear, FiscalError> {
        Ok(self.history()?.fiscal_year(fiscal_year)?)
    }

    /// The fiscal month containing today.
    ///
    /// # Errors
    /// Returns `FiscalError::DateNotInFiscalYear` if today falls in a gap
    /// before a recorded year, or any error from loading the history.
    pub fn current_fiscal_month(&self) -> Result<FiscalMonth, FiscalError> {
        let history = self.history()?;
        let today = self.clock.today();
        let fiscal_year = history.fiscal_year_of_date(today);
        history
            .fiscal_year(fiscal_year)?
            .month_of_date(today)
            .copied()
            .ok_or(FiscalError::DateNotInFiscalYear {
                date: today,
                fiscal_year,
            })
    }

    /// Week number (1-5) of `date` within its fiscal month of the current
    /// fiscal year.
    ///
    /// # Errors
    /// Returns `FiscalError::DateNotInFiscalYear` if `date` is outside the
    /// current fiscal year.
    pub fn week_number_of_fiscal_month(&self, date: NaiveDate) -> Result<FiscalWeekNumber, FiscalError> {
        let history = self.history()?;
        let fiscal_year = history.fiscal_year_of_date(self.clock.today());
        let (_, week) = history.locate_in_fiscal_year(fiscal_year, date)?;
        Ok(week)
    }

    /// # Errors
    /// See [`ConfigHistory::coordinate_of`].
    pub fn coordinate_of(&self, date: NaiveDate) -> Result<FiscalCoordinate, FiscalError> {
        self.history()?.coordinate_of(date)
    }

    /// Records a fiscal year and persists the history.
    ///
    /// # Errors
    /// Returns `FiscalError::Config` if the record is rejected (the stored
    /// history is left untouched) or `FiscalError::Store` if persisting fails.
    pub fn add_or_update_year(&mut self, record: FiscalYearConfig) -> Result<(), FiscalError> {
        let mut history = self.history()?;
        if let Err(err) = history.add_or_update(record) {
            warn!(fiscal_year = record.fiscal_year, %err, "rejected fiscal year record");
            return Err(err.into());
        }

        self.store.save(&history)?;
        info!(
            fiscal_year = record.fiscal_year,
            start = %record.start_date,
            records = history.len(),
            "recorded fiscal year"
        );
        Ok(())
    }

    /// Replaces the stored history with the single 2018 bootstrap record.
    ///
    /// # Errors
    /// Returns `FiscalError::Store` if persisting fails.
    pub fn restore_defaults(&mut self) -> Result<ConfigHistory, FiscalError> {
        let history = ConfigHistory::default();
        self.store.save(&history)?;
        info!(fiscal_year = history.latest().fiscal_year, "restored default fiscal year history");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, history, month_number, record, week_number};
    use crate::{FixedClock, MemoryStore};

    fn calendar_on(today: NaiveDate) -> FiscalCalendar<MemoryStore, FixedClock> {
        FiscalCalendar::new(MemoryStore::default(), FixedClock(today))
    }

    /// 2018 bootstrap plus a 2021 record starting one week later than projected.
    fn drifted_history() -> ConfigHistory {
        history(vec![record(2018, date(2018, 2, 4)), record(2021, date(2021, 2, 7))])
    }

    #[test]
    fn test_start_of_fiscal_year_projection_cases() {
        struct TestCase {
            fiscal_year: i32,
            expected:    NaiveDate,
            description: &'static str,
        }

        let cases = [
            TestCase {
                fiscal_year: 2018,
                expected:    date(2018, 2, 4),
                description: "exact record",
            },
            TestCase {
                fiscal_year: 2019,
                expected:    date(2019, 2, 3),
                description: "one year ahead",
            },
            TestCase {
                fiscal_year: 2020,
                expected:    date(2020, 2, 2),
                description: "two years ahead",
            },
            TestCase {
                fiscal_year: 2017,
                expected:    date(2017, 2, 5),
                description: "one year back",
            },
            TestCase {
                fiscal_year: 2015,
                expected:    date(2015, 2, 8),
                description: "three years back",
            },
        ];

        let history = ConfigHistory::default();
        for case in &cases {
            assert_eq!(
                history.start_of_fiscal_year(case.fiscal_year).unwrap(),
                case.expected,
                "{}",
                case.description
            );
        }
    }

    #[test]
    fn test_start_of_fiscal_year_is_idempotent() {
        let history = drifted_history();
        let first = history.start_of_fiscal_year(2025).unwrap();
        let second = history.start_of_fiscal_year(2025).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_projection_uses_nearest_preceding_record() {
        let history = drifted_history();
        // Between the records: projected from 2018
        assert_eq!(history.start_of_fiscal_year(2020).unwrap(), date(2020, 2, 2));
        // After the newer record: projected from 2021, keeping its drift
        assert_eq!(history.start_of_fiscal_year(2022).unwrap(), date(2022, 2, 6));
        // Before every record: projected back from the oldest
        assert_eq!(history.start_of_fiscal_year(2017).unwrap(), date(2017, 2, 5));
    }

    #[test]
    fn test_month_lengths_of_fiscal_year() {
        let custom = MonthLengths::new([35, 28, 28, 35, 28, 28, 35, 28, 28, 35, 28, 28]).unwrap();
        let history = history(vec![
            record(2018, date(2018, 2, 4)),
            FiscalYearConfig::new(2019, date(2019, 2, 3), custom),
        ]);

        assert_eq!(history.month_lengths_of_fiscal_year(2019), custom);
        assert_eq!(history.month_lengths_of_fiscal_year(2018), MonthLengths::STANDARD);
        assert_eq!(history.month_lengths_of_fiscal_year(2030), MonthLengths::STANDARD);
    }

    #[test]
    fn test_fiscal_year_of_date_cases() {
        struct TestCase {
            date:        NaiveDate,
            expected:    i32,
            description: &'static str,
        }

        let cases = [
            TestCase {
                date:        date(2018, 2, 4),
                expected:    2018,
                description: "first day of the anchor year",
            },
            TestCase {
                date:        date(2019, 2, 2),
                expected:    2018,
                description: "last day of the anchor year",
            },
            TestCase {
                date:        date(2019, 2, 3),
                expected:    2019,
                description: "first day of the next year",
            },
            TestCase {
                date:        date(2026, 10, 16),
                expected:    2026,
                description: "eight years on",
            },
            TestCase {
                date:        date(2017, 6, 1),
                expected:    2017,
                description: "before the anchor",
            },
            TestCase {
                date:        date(2016, 1, 1),
                expected:    2015,
                description: "well before the anchor rounds down",
            },
        ];

        let history = ConfigHistory::default();
        for case in &cases {
            let year = history.fiscal_year_of_date(case.date);
            assert_eq!(year, case.expected, "{}", case.description);
            let geometry = history.fiscal_year(year).unwrap();
            assert!(geometry.contains(case.date), "{}", case.description);
        }
    }

    #[test]
    fn test_fiscal_year_of_date_with_drifted_record() {
        let history = drifted_history();
        assert_eq!(history.fiscal_year_of_date(date(2021, 2, 7)), 2021);
        assert_eq!(history.fiscal_year_of_date(date(2022, 2, 5)), 2021);
        assert_eq!(history.fiscal_year_of_date(date(2022, 2, 6)), 2022);
        // 2020 is projected to end 2021-01-30; the week before 2021 starts is a gap
        assert_eq!(history.fiscal_year_of_date(date(2021, 2, 1)), 2020);
    }

    #[test]
    fn test_coordinate_of() {
        let history = ConfigHistory::default();

        let coordinate = history.coordinate_of(date(2018, 2, 4)).unwrap();
        assert_eq!(
            coordinate,
            FiscalCoordinate::new(2018, month_number(1), week_number(1))
        );

        let coordinate = history.coordinate_of(date(2018, 3, 4)).unwrap();
        assert_eq!(
            coordinate,
            FiscalCoordinate::new(2018, month_number(2), week_number(1))
        );

        let coordinate = history.coordinate_of(date(2018, 4, 7)).unwrap();
        assert_eq!(
            coordinate,
            FiscalCoordinate::new(2018, month_number(2), week_number(5))
        );

        let coordinate = history.coordinate_of(date(2019, 2, 3)).unwrap();
        assert_eq!(
            coordinate,
            FiscalCoordinate::new(2019, month_number(1), week_number(1))
        );
    }

    #[test]
    fn test_coordinate_of_date_in_gap() {
        let result = drifted_history().coordinate_of(date(2021, 2, 1));
        assert!(matches!(
            result,
            Err(FiscalError::DateNotInFiscalYear {
                fiscal_year: 2020,
                ..
            })
        ));
    }

    #[test]
    fn test_current_fiscal_year() {
        assert_eq!(calendar_on(date(2018, 2, 4)).current_fiscal_year().unwrap(), 2018);
        assert_eq!(calendar_on(date(2019, 2, 2)).current_fiscal_year().unwrap(), 2018);
        assert_eq!(calendar_on(date(2019, 2, 3)).current_fiscal_year().unwrap(), 2019);
    }

    #[test]
    fn test_current_fiscal_month() {
        let month = calendar_on(date(2018, 3, 20)).current_fiscal_month().unwrap();
        assert_eq!(month.number(), month_number(2));
        assert_eq!(month.start(), date(2018, 3, 4));
        assert_eq!(month.end(), date(2018, 4, 7));
    }

    /// Advances one day every time it is read.
    struct TickingClock(std::cell::Cell<NaiveDate>);

    impl Clock for TickingClock {
        fn today(&self) -> NaiveDate {
            let today = self.0.get();
            self.0.set(today.succ_opt().unwrap());
            today
        }
    }

    #[test]
    fn test_current_fiscal_month_reads_clock_once() {
        // The last day of 2018, so a second read would land in 2019
        let clock = TickingClock(std::cell::Cell::new(date(2019, 2, 2)));
        let calendar = FiscalCalendar::new(MemoryStore::default(), clock);

        let month = calendar.current_fiscal_month().unwrap();
        assert_eq!(month.number(), month_number(12));
        assert_eq!(month.end(), date(2019, 2, 2));
        assert_eq!(calendar.clock().0.get(), date(2019, 2, 3));
    }

    #[test]
    fn test_week_number_of_fiscal_month() {
        let calendar = calendar_on(date(2018, 6, 1));
        assert_eq!(
            calendar.week_number_of_fiscal_month(date(2018, 2, 4)).unwrap(),
            week_number(1)
        );
        assert_eq!(
            calendar.week_number_of_fiscal_month(date(2018, 3, 4)).unwrap(),
            week_number(1)
        );
        assert_eq!(
            calendar.week_number_of_fiscal_month(date(2018, 3, 3)).unwrap(),
            week_number(4)
        );
        assert_eq!(
            calendar.week_number_of_fiscal_month(date(2018, 3, 14)).unwrap(),
            week_number(2)
        );
    }

    #[test]
    fn test_week_number_outside_current_year_is_reported() {
        let calendar = calendar_on(date(2018, 6, 1));
        let result = calendar.week_number_of_fiscal_month(date(2019, 3, 1));
        assert!(matches!(
            result,
            Err(FiscalError::DateNotInFiscalYear {
                fiscal_year: 2018,
                ..
            })
        ));
    }

    #[test]
    fn test_facade_scenario() {
        let calendar = calendar_on(date(2018, 6, 1));
        assert_eq!(calendar.start_of_fiscal_year(2019).unwrap(), date(2019, 2, 3));
        assert_eq!(
            calendar.month_lengths_of_fiscal_year(2019).unwrap(),
            MonthLengths::STANDARD
        );
        let year = calendar.fiscal_year(2018).unwrap();
        assert_eq!(year.month(month_number(1)).end(), date(2018, 3, 3));
    }

    #[test]
    fn test_add_year_round_trip() {
        let mut calendar = calendar_on(date(2020, 6, 1));
        calendar.add_or_update_year(record(2020, date(2020, 2, 9))).unwrap();

        assert_eq!(calendar.store().saves(), 1);
        assert_eq!(calendar.start_of_fiscal_year(2020).unwrap(), date(2020, 2, 9));
        assert_eq!(calendar.history().unwrap().latest().fiscal_year, 2020);
        assert_eq!(calendar.current_fiscal_year().unwrap(), 2020);
    }

    #[test]
    fn test_update_latest_year_round_trip() {
        let mut calendar = calendar_on(date(2018, 6, 1));
        let custom = MonthLengths::new([35, 28, 28, 35, 28, 28, 35, 28, 28, 35, 28, 28]).unwrap();
        calendar
            .add_or_update_year(FiscalYearConfig::new(2018, date(2018, 2, 11), custom))
            .unwrap();

        assert_eq!(calendar.start_of_fiscal_year(2018).unwrap(), date(2018, 2, 11));
        assert_eq!(calendar.month_lengths_of_fiscal_year(2018).unwrap(), custom);
        assert_eq!(calendar.history().unwrap().len(), 1);
    }

    #[test]
    fn test_add_past_year_is_rejected_and_not_saved() {
        let mut calendar = calendar_on(date(2018, 6, 1));
        let result = calendar.add_or_update_year(record(2017, date(2017, 2, 5)));

        assert!(matches!(
            result,
            Err(FiscalError::Config(ConfigError::PastFiscalYear {
                year:   2017,
                latest: 2018,
            }))
        ));
        assert_eq!(calendar.store().saves(), 0);
        assert_eq!(calendar.history().unwrap(), ConfigHistory::default());
    }

    #[test]
    fn test_restore_defaults() {
        let store = MemoryStore::new(drifted_history());
        let mut calendar = FiscalCalendar::new(store, FixedClock(date(2022, 3, 1)));
        assert_eq!(calendar.current_fiscal_year().unwrap(), 2022);

        let restored = calendar.restore_defaults().unwrap();
        assert_eq!(restored, ConfigHistory::default());
        assert_eq!(calendar.history().unwrap(), ConfigHistory::default());
        assert_eq!(calendar.store().saves(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = FiscalError::DateNotInFiscalYear {
            date:        date(2019, 3, 1),
            fiscal_year: 2018,
        };
        assert_eq!(err.to_string(), "2019-03-01 does not fall inside fiscal year 2018");

        let err = FiscalError::from(ConfigError::EmptyHistory);
        assert_eq!(err.to_string(), "Fiscal year history is empty");
    }
}
