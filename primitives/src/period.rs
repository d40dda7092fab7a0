use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// The date format used by the Search Ad API for `timeRange` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month {month} for year {year}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("Period starts ({since}) after it ends ({until})")]
    Inverted { since: NaiveDate, until: NaiveDate },
}

/// An inclusive range of calendar dates for which stats or reports are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl Period {
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self, PeriodError> {
        if since > until {
            return Err(PeriodError::Inverted { since, until });
        }

        Ok(Self { since, until })
    }

    /// The whole calendar month, from the 1st to the last day of the month.
    ///
    /// ```
    /// use primitives::Period;
    ///
    /// let february = Period::month(2024, 2).expect("Valid month");
    /// assert_eq!("2024-02-01 ~ 2024-02-29", february.to_string());
    /// ```
    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        let invalid = || PeriodError::InvalidMonth { year, month };

        let since = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let until = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self { since, until })
    }

    pub fn year(&self) -> i32 {
        self.since.year()
    }

    pub fn month_number(&self) -> u32 {
        self.since.month()
    }

    /// The `{since, until}` object which the API expects JSON-encoded
    /// in the `timeRange` query parameter.
    pub fn time_range(&self) -> Value {
        json!({
            "since": self.since.format(DATE_FORMAT).to_string(),
            "until": self.until.format(DATE_FORMAT).to_string(),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.since.format(DATE_FORMAT),
            self.until.format(DATE_FORMAT)
        )
    }
}
