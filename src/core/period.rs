//! Calendar keys and month arithmetic.
//!
//! Date keys are canonical `YYYY-MM-DD`, month keys `YYYY-MM`. Both are plain ASCII and
//! sort lexicographically in chronological order.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Monday-first weekday order used for menu plans.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A calendar month, serialized as its `YYYY-MM` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Builds a month key, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidKey {
                key: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1..=12
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Validated in the constructors.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        self.days().count().try_into().unwrap_or(0)
    }

    /// Every day of the month, in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        first
            .iter_days()
            .take_while(move |d| d.month() == first.month())
    }

    /// How many times each weekday occurs in the month, Monday first.
    #[must_use]
    pub fn weekday_occurrences(self) -> [u32; 7] {
        let mut counts = [0; 7];
        for day in self.days() {
            counts[day.weekday().num_days_from_monday() as usize] += 1;
        }
        counts
    }

    /// Whether a `YYYY-MM-DD` key falls inside this month.
    #[must_use]
    pub fn contains_key(self, date_key: &str) -> bool {
        date_key.starts_with(&self.to_string())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidKey { key: s.to_string() };
        if s.len() != 7 || !s.is_ascii() {
            return Err(invalid());
        }
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(month: MonthKey) -> Self {
        month.to_string()
    }
}

/// Formats a date as a `YYYY-MM-DD` key.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM-DD` key.
pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    if key.len() != 10 {
        return Err(Error::InvalidKey {
            key: key.to_string(),
        });
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| Error::InvalidKey {
        key: key.to_string(),
    })
}

/// Maps a stored weekday index (0 = Monday) back to a weekday.
#[must_use]
pub fn weekday_from_index(index: i32) -> Option<Weekday> {
    usize::try_from(index)
        .ok()
        .and_then(|i| WEEKDAYS.get(i).copied())
}
