use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar-day identifier, `YYYY-MM-DD`. Partitions tasks by day and is
/// the key shape used in the persisted JSON mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

/// The currently viewed date. Pure in-memory state; resets to system-today
/// on every process start.
#[derive(Debug, Clone, Copy)]
pub struct DayCursor {
    current: NaiveDate,
}

impl DayCursor {
    pub fn new(start: NaiveDate) -> Self {
        Self { current: start }
    }

    pub fn advance(&mut self, delta_days: i64) {
        self.current = self
            .current
            .checked_add_signed(Duration::days(delta_days))
            .unwrap_or(self.current);
    }

    pub fn key(&self) -> DayKey {
        DayKey(self.current)
    }

    pub fn label(&self, today: NaiveDate) -> String {
        if self.current == today {
            "Today".to_string()
        } else if self.current - today == Duration::days(1) {
            "Tomorrow".to_string()
        } else {
            self.current.format("%A, %B %-d, %Y").to_string()
        }
    }
}
