//! Forecast period parsing and time-window aggregation
//!
//! Every row of a data file carries a `period` field whose first four
//! characters are the calendar year and whose last two characters are the
//! month (`YYYYMM`, sometimes embedded in a longer value). Each period
//! expands to the full month it names, and the dataset's time period is
//! the minimal window covering every period observed across all data
//! files in a run.

use chrono::{Datelike, NaiveDate};

use crate::errors::{PeriodError, PeriodResult};

/// One calendar month named by a period code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Parse a period field
    ///
    /// The year is read from the first four characters and the month from
    /// the last two, so both `"201001"` and longer forms such as
    /// `"2010-01"` decode to January 2010.
    pub fn parse(raw: &str) -> PeriodResult<Self> {
        let value = raw.trim();
        if value.len() < 6 {
            return Err(PeriodError::TooShort {
                value: raw.to_string(),
            });
        }
        let year_digits = value.get(..4).ok_or_else(|| PeriodError::TooShort {
            value: raw.to_string(),
        })?;
        let month_digits = value
            .get(value.len() - 2..)
            .ok_or_else(|| PeriodError::TooShort {
                value: raw.to_string(),
            })?;

        let year: i32 = year_digits.parse().map_err(|_| PeriodError::InvalidYear {
            value: raw.to_string(),
        })?;
        let month: u32 = month_digits.parse().map_err(|_| PeriodError::InvalidMonth {
            value: raw.to_string(),
        })?;
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth {
                value: raw.to_string(),
            });
        }

        Ok(Self { year, month })
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // Year is at most four digits and month is validated, so the date
        // is always constructible.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("year and month validated at parse")
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        let next_month = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        next_month
            .and_then(|d| d.pred_opt())
            .expect("successor month of a four-digit year is in range")
    }

    /// The full date range covered by this month
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.last_day())
    }
}

/// Accumulator for the dataset-wide time period
///
/// Starts empty; the first observation sets the window and every later
/// observation widens it to the minimum start and maximum end seen. A run
/// that observes no periods leaves the window empty, which callers must
/// treat as "no time period known" rather than a valid range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeWindow {
    range: Option<(NaiveDate, NaiveDate)>,
}

impl TimeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the window to cover `[start, end]`
    pub fn observe(&mut self, start: NaiveDate, end: NaiveDate) {
        self.range = match self.range {
            None => Some((start, end)),
            Some((s, e)) => Some((s.min(start), e.max(end))),
        };
    }

    /// Widen the window to cover a whole month period
    pub fn observe_period(&mut self, period: &MonthPeriod) {
        let (start, end) = period.bounds();
        self.observe(start, end);
    }

    /// The covered range, if any period was observed
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }
}
