//! Total and mean trip duration, broken down into calendar units.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::Outcome;
use super::utility::mean;
use crate::model::Table;

pub const MINUTE: u64 = 60;
pub const HOUR: u64 = 3_600;
pub const DAY: u64 = 86_400;
/// A 365.25-day year.
pub const YEAR: u64 = 31_557_600;

/// Totals above this many seconds get a year component.
const DAY_TIER_LIMIT: f64 = 34_557_600.0;

/// Largest unit shown in a [`Breakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Years,
}

impl Unit {
    fn for_seconds(seconds: f64) -> Self {
        if seconds <= MINUTE as f64 {
            Unit::Seconds
        } else if seconds <= HOUR as f64 {
            Unit::Minutes
        } else if seconds <= DAY as f64 {
            Unit::Hours
        } else if seconds <= DAY_TIER_LIMIT {
            Unit::Days
        } else {
            Unit::Years
        }
    }
}

/// A duration split into whole units plus seconds rounded to 1/100.
///
/// The largest unit takes the whole quotient, so the parts always add up to
/// the original value (within half a centisecond).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub largest: Unit,
    pub years: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl Breakdown {
    /// Breakdown for a summed duration; may use years.
    pub fn for_total(seconds: f64) -> Self {
        Self::decompose(seconds, Unit::Years)
    }

    /// Breakdown for a mean duration; never goes beyond days.
    pub fn for_mean(seconds: f64) -> Self {
        Self::decompose(seconds, Unit::Days)
    }

    fn decompose(seconds: f64, ceiling: Unit) -> Self {
        let largest = Unit::for_seconds(seconds).min(ceiling);
        let mut centis = (seconds.max(0.0) * 100.0).round() as u64;

        let mut take = |unit: Unit, size: u64| -> u64 {
            if largest < unit {
                return 0;
            }
            let whole = centis / (size * 100);
            centis %= size * 100;
            whole
        };

        let years = take(Unit::Years, YEAR);
        let days = take(Unit::Days, DAY);
        let hours = take(Unit::Hours, HOUR);
        let minutes = take(Unit::Minutes, MINUTE);

        Breakdown {
            largest,
            years,
            days,
            hours,
            minutes,
            seconds: centis as f64 / 100.0,
        }
    }

    /// Reassembles the breakdown into seconds.
    pub fn as_seconds(&self) -> f64 {
        (self.years * YEAR + self.days * DAY + self.hours * HOUR + self.minutes * MINUTE) as f64
            + self.seconds
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.largest >= Unit::Years {
            write!(f, "{} year(s) ", self.years)?;
        }
        if self.largest >= Unit::Days {
            write!(f, "{} day(s) ", self.days)?;
        }
        if self.largest >= Unit::Hours {
            write!(f, "{} hour(s) ", self.hours)?;
        }
        if self.largest >= Unit::Minutes {
            write!(f, "{} min(s) ", self.minutes)?;
        }
        write!(f, "{:.2} sec(s)", self.seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationFigure {
    /// Seconds.
    pub value: f64,
    pub breakdown: Breakdown,
    pub formatted: String,
}

impl DurationFigure {
    fn new(value: f64, breakdown: Breakdown) -> Self {
        DurationFigure {
            value,
            breakdown,
            formatted: breakdown.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total: DurationFigure,
    pub mean: DurationFigure,
    /// Trips that contributed a duration.
    pub counted: usize,
}

/// Sum and mean of every present trip duration.
#[tracing::instrument(skip(table), fields(trips = table.len()))]
pub fn duration_stats(table: &Table) -> Outcome<DurationStats> {
    if !table.schema().trip_duration {
        debug!("Dataset has no trip duration column");
        return Outcome::SchemaUnavailable;
    }

    let durations: Vec<f64> = table
        .records()
        .iter()
        .filter_map(|r| r.trip_duration)
        .collect();
    let Some(average) = mean(&durations) else {
        return Outcome::NoData;
    };
    let total: f64 = durations.iter().sum();

    Outcome::Computed(DurationStats {
        total: DurationFigure::new(total, Breakdown::for_total(total)),
        mean: DurationFigure::new(average, Breakdown::for_mean(average)),
        counted: durations.len(),
    })
}
