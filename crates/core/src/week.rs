//! Week arithmetic for the budget lookup.
//!
//! Weeks run Monday 00:00:00.000 to Sunday 23:59:59.999 in local wall time.
//! The budget store is keyed by `YYYY-WW`, where the week number counts
//! seven-day blocks from January 1st offset by January 1st's weekday (Sunday
//! based). This is not ISO 8601 numbering and must stay in step with the
//! keys the upstream system writes.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearWeek {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for YearWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.week)
    }
}

impl FromStr for YearWeek {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidYearWeek(value.to_string());
        let (year, week) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;
        if !(1..=54).contains(&week) {
            return Err(invalid());
        }
        Ok(Self { year, week })
    }
}

impl TryFrom<String> for YearWeek {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearWeek> for String {
    fn from(value: YearWeek) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    pub fn containing(now: NaiveDateTime) -> Self {
        let date = now.date();
        let day = date.weekday().num_days_from_sunday();
        // Sunday closes the week that started six days earlier.
        let days_to_monday = if day == 0 { 6 } else { day - 1 };
        let monday = date - Duration::days(i64::from(days_to_monday));

        let start = monday.and_time(NaiveTime::MIN);
        let end = start + Duration::days(7) - Duration::milliseconds(1);
        Self { start, end }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().naive_local())
    }

    pub fn monday(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn year_week(&self) -> YearWeek {
        let monday = self.monday();
        let days_since_jan1 = monday.ordinal0();
        let jan1_weekday =
            (monday.weekday().num_days_from_sunday() + 7 - days_since_jan1 % 7) % 7;
        let week = (days_since_jan1 + jan1_weekday + 1).div_ceil(7);
        YearWeek { year: monday.year(), week }
    }
}
