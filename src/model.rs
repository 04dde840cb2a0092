//! Trip records, the dataset-wide schema, and the in-memory trip table.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

/// A single bike rental as read from a city trip log.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    /// Seconds, never negative.
    pub trip_duration: Option<f64>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl TripRecord {
    /// Create a record with only the required start time set.
    pub fn starting_at(start_time: NaiveDateTime) -> Self {
        TripRecord {
            start_time,
            end_time: None,
            start_station: None,
            end_station: None,
            trip_duration: None,
            user_type: None,
            gender: None,
            birth_year: None,
        }
    }
}

/// Which optional columns a dataset carries.
///
/// Columns are either present for every record of a dataset or for none of
/// them; individual values inside a present column may still be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schema {
    pub end_time: bool,
    /// Both `Start Station` and `End Station`.
    pub stations: bool,
    pub trip_duration: bool,
    pub user_type: bool,
    pub gender: bool,
    pub birth_year: bool,
}

impl Schema {
    /// Schema with every optional column present.
    pub fn full() -> Self {
        Schema {
            end_time: true,
            stations: true,
            trip_duration: true,
            user_type: true,
            gender: true,
            birth_year: true,
        }
    }

    /// Names of the optional columns this dataset lacks.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.end_time {
            missing.push("End Time");
        }
        if !self.stations {
            missing.push("Start Station/End Station");
        }
        if !self.trip_duration {
            missing.push("Trip Duration");
        }
        if !self.user_type {
            missing.push("User Type");
        }
        if !self.gender {
            missing.push("Gender");
        }
        if !self.birth_year {
            missing.push("Birth Year");
        }
        missing
    }
}

/// Calendar parts derived from a record's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// 1 = January … 12 = December.
    pub month: u32,
    pub weekday: Weekday,
    /// 0–23.
    pub hour: u32,
}

impl TimeParts {
    pub fn of(start_time: &NaiveDateTime) -> Self {
        TimeParts {
            month: start_time.month(),
            weekday: start_time.weekday(),
            hour: start_time.hour(),
        }
    }
}

/// An ordered, immutable sequence of trips sharing one schema.
///
/// Time parts are derived once on construction and travel with their record
/// through filtering, so statistics never re-derive them.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    records: Vec<TripRecord>,
    times: Vec<TimeParts>,
}

impl Table {
    pub fn new(schema: Schema, records: Vec<TripRecord>) -> Self {
        let times = records.iter().map(|r| TimeParts::of(&r.start_time)).collect();
        Table {
            schema,
            records,
            times,
        }
    }

    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Build a table from rows that already carry their time parts.
    pub(crate) fn from_parts(schema: Schema, rows: Vec<(TripRecord, TimeParts)>) -> Self {
        let (records, times) = rows.into_iter().unzip();
        Table {
            schema,
            records,
            times,
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn times(&self) -> &[TimeParts] {
        &self.times
    }

    /// Records paired with their derived time parts, in load order.
    pub fn rows(&self) -> impl Iterator<Item = (&TripRecord, &TimeParts)> {
        self.records.iter().zip(self.times.iter())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Calendar year of the latest trip start, if any.
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.start_time.year()).max()
    }
}
