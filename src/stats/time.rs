//! Most frequent month, weekday and starting hour.

use std::fmt;

use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

use super::Outcome;
use super::utility::mode;
use crate::filter::{WEEKDAYS, month_name, weekday_name};
use crate::model::Table;

/// A one-hour window starting at `start:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    pub start: u32,
}

impl HourRange {
    /// Upper bound of the window; 23 wraps to 0.
    pub fn end(&self) -> u32 {
        (self.start + 1) % 24
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00 to {:02}:00", self.start, self.end())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub month: u32,
    pub weekday: Weekday,
    pub hour: HourRange,
}

impl TimeStats {
    pub fn month_name(&self) -> &'static str {
        month_name(self.month).unwrap_or("Unknown")
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// Modes of the derived month, weekday and hour.
///
/// Ties go to the smallest value; weekdays compare Monday first.
#[tracing::instrument(skip(table), fields(trips = table.len()))]
pub fn time_stats(table: &Table) -> Outcome<TimeStats> {
    let times = table.times();

    let Some(month) = mode(times.iter().map(|t| t.month)) else {
        debug!("No trips to derive travel times from");
        return Outcome::NoData;
    };
    let weekday = mode(times.iter().map(|t| t.weekday.num_days_from_monday()))
        .map(|i| WEEKDAYS[i as usize]);
    let hour = mode(times.iter().map(|t| t.hour));

    match (weekday, hour) {
        (Some(weekday), Some(hour)) => Outcome::Computed(TimeStats {
            month,
            weekday,
            hour: HourRange { start: hour },
        }),
        _ => Outcome::NoData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Schema, TripRecord};
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn test_month_tie_breaks_to_smallest() {
        let table = table_of(&[
            at(2017, 2, 1, 9),
            at(2017, 1, 3, 9),
            at(2017, 1, 5, 9),
            at(2017, 2, 8, 9),
            at(2017, 3, 1, 9),
        ]);
        let stats = time_stats(&table).computed().unwrap();
        assert_eq!(stats.month, 1);
        assert_eq!(stats.month_name(), "January");
    }

    #[test]
    fn test_month_mode_prefers_most_frequent() {
        let table = table_of(&[at(2017, 1, 3, 9), at(2017, 1, 4, 9), at(2017, 2, 1, 9)]);
        assert_eq!(time_stats(&table).computed().unwrap().month, 1);
    }

    #[test]
    fn test_weekday_mode() {
        // 2017-01-02 and 2017-01-09 are Mondays, 2017-01-04 a Wednesday.
        let table = table_of(&[at(2017, 1, 2, 9), at(2017, 1, 9, 9), at(2017, 1, 4, 9)]);
        let stats = time_stats(&table).computed().unwrap();
        assert_eq!(stats.weekday, Weekday::Mon);
        assert_eq!(stats.weekday_name(), "Monday");
    }

    #[test]
    fn test_weekday_tie_prefers_monday_over_sunday() {
        // 2017-01-01 is a Sunday.
        let table = table_of(&[at(2017, 1, 1, 9), at(2017, 1, 2, 9)]);
        assert_eq!(time_stats(&table).computed().unwrap().weekday, Weekday::Mon);
    }

    #[test]
    fn test_hour_range() {
        let table = table_of(&[at(2017, 1, 2, 10), at(2017, 1, 3, 10), at(2017, 1, 4, 14)]);
        let stats = time_stats(&table).computed().unwrap();
        assert_eq!(stats.hour.to_string(), "10:00 to 11:00");
    }

    #[test]
    fn test_hour_range_wraps_at_midnight() {
        let table = table_of(&[at(2017, 1, 2, 23), at(2017, 1, 3, 23), at(2017, 1, 4, 1)]);
        let stats = time_stats(&table).computed().unwrap();
        assert_eq!(stats.hour.start, 23);
        assert_eq!(stats.hour.to_string(), "23:00 to 00:00");
    }

    #[test]
    fn test_empty_table_is_no_data() {
        assert_eq!(time_stats(&Table::empty(Schema::full())), Outcome::NoData);
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    fn table_of(starts: &[NaiveDateTime]) -> Table {
        Table::new(
            Schema::default(),
            starts.iter().copied().map(TripRecord::starting_at).collect(),
        )
    }
}
