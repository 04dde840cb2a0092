//! Descriptive statistics over a filtered trip table.
//!
//! Each component is a pure function of `&Table` and reports its result as an
//! [`Outcome`], so a missing column or an empty selection never aborts the
//! others.

pub mod duration;
pub mod station;
pub mod time;
pub mod user;
pub mod utility;

use serde::Serialize;

use crate::filter::{DayFilter, MonthFilter};
use crate::model::Table;

use duration::{DurationStats, duration_stats};
use station::{StationStats, station_stats};
use time::{TimeStats, time_stats};
use user::{UserStats, user_stats};

/// Result of a single statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    /// The dataset does not carry the column this statistic needs.
    SchemaUnavailable,
    /// The selection (or its non-missing subset) is empty.
    NoData,
}

impl<T> Outcome<T> {
    pub fn computed(self) -> Option<T> {
        match self {
            Outcome::Computed(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Computed(v) => Outcome::Computed(v),
            Outcome::SchemaUnavailable => Outcome::SchemaUnavailable,
            Outcome::NoData => Outcome::NoData,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Outcome::Computed(v),
            None => Outcome::NoData,
        }
    }
}

/// Every statistic for one `(city, month, day)` selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub city: String,
    pub month: MonthFilter,
    pub day: DayFilter,
    pub trips: usize,
    pub time: Outcome<TimeStats>,
    pub stations: Outcome<StationStats>,
    pub durations: Outcome<DurationStats>,
    pub users: Outcome<UserStats>,
}

impl Report {
    /// Compute all statistics over an already filtered table.
    pub fn compute(
        city: &str,
        month: MonthFilter,
        day: DayFilter,
        filtered: &Table,
        reference_year: i32,
    ) -> Self {
        Report {
            city: city.to_string(),
            month,
            day,
            trips: filtered.len(),
            time: time_stats(filtered),
            stations: station_stats(filtered),
            durations: duration_stats(filtered),
            users: user_stats(filtered, reference_year),
        }
    }
}
