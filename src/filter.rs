//! Month and weekday selection over a trip table.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

use crate::model::Table;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekdays in Monday = 0 … Sunday = 6 order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// English name of a month number (1-based). Out-of-range values yield `None`.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

/// Month selector: every month, or one calendar month (1–12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthFilter {
    All,
    Only(u32),
}

impl MonthFilter {
    fn matches(&self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(m) => *m == month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim().to_ascii_lowercase();
        if input == "all" {
            return Ok(MonthFilter::All);
        }
        if let Ok(n) = input.parse::<u32>() {
            if (1..=12).contains(&n) {
                return Ok(MonthFilter::Only(n));
            }
            bail!("month number must be between 1 and 12, got {n}");
        }
        let position = MONTH_NAMES.iter().position(|name| {
            let name = name.to_ascii_lowercase();
            input == name || (input.len() == 3 && name.starts_with(&input))
        });
        match position {
            Some(i) => Ok(MonthFilter::Only(i as u32 + 1)),
            None => bail!("unknown month '{}', expected a month name, 1-12 or 'all'", s.trim()),
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => write!(f, "All"),
            MonthFilter::Only(m) => write!(f, "{}", month_name(*m).unwrap_or("Unknown")),
        }
    }
}

/// Weekday selector: every day, or one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayFilter {
    All,
    Only(Weekday),
}

impl DayFilter {
    fn matches(&self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(d) => *d == day,
        }
    }
}

impl FromStr for DayFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim().to_ascii_lowercase();
        if input == "all" {
            return Ok(DayFilter::All);
        }
        let position = WEEKDAY_NAMES.iter().position(|name| {
            let name = name.to_ascii_lowercase();
            input == name || (input.len() == 3 && name.starts_with(&input))
        });
        match position {
            Some(i) => Ok(DayFilter::Only(WEEKDAYS[i])),
            None => bail!("unknown day '{}', expected a weekday name or 'all'", s.trim()),
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => write!(f, "All"),
            DayFilter::Only(d) => write!(f, "{}", weekday_name(*d)),
        }
    }
}

/// Keep the trips whose start falls in the selected month and weekday.
///
/// Returns a new table in the original order; `table` is left untouched.
pub fn filter(table: &Table, month: MonthFilter, day: DayFilter) -> Table {
    if month == MonthFilter::All && day == DayFilter::All {
        return table.clone();
    }

    let rows = table
        .rows()
        .filter(|(_, t)| month.matches(t.month) && day.matches(t.weekday))
        .map(|(r, t)| (r.clone(), *t))
        .collect();

    let filtered = Table::from_parts(table.schema(), rows);
    debug!(
        %month,
        %day,
        before = table.len(),
        after = filtered.len(),
        "Table filtered"
    );
    filtered
}
