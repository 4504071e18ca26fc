use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Elapsed time between a request being raised and a reviewer acting on it.
///
/// Formatting picks the coarsest unit that applies: days and hours from one
/// day on, hours and minutes from one hour on, otherwise minutes alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turnaround {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Turnaround {
    /// Order of the two instants does not matter.
    pub fn between(first: DateTime<Utc>, second: DateTime<Utc>) -> Self {
        let total_minutes = (second - first).num_minutes().abs();
        Self {
            days: total_minutes / MINUTES_PER_DAY,
            hours: (total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR,
            minutes: total_minutes % MINUTES_PER_HOUR,
        }
    }
}

impl fmt::Display for Turnaround {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days >= 1 {
            write!(f, "{} day(s), {} hour(s)", self.days, self.hours)
        } else if self.hours >= 1 {
            write!(f, "{} hour(s), {} min(s)", self.hours, self.minutes)
        } else {
            write!(f, "{} min(s)", self.minutes)
        }
    }
}
