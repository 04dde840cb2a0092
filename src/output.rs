//! Rendering and persistence for trip statistics.
//!
//! Supports a human-readable text report, JSON serialization, CSV pages of raw
//! records, and appending one summary row per report to a CSV file.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::model::{Schema, TripRecord};
use crate::stats::duration::DurationStats;
use crate::stats::station::StationStats;
use crate::stats::time::TimeStats;
use crate::stats::user::{
    AgeNote, BirthYearMode, BirthYearStats, CategoryCounts, UserStats,
};
use crate::stats::{Outcome, Report};

const RULE_WIDTH: usize = 40;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Serializes a report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Renders a report as the text shown to an analyst.
pub fn render_report(report: &Report) -> String {
    TextReport(report).to_string()
}

/// "new york city" → "New York City".
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

struct TextReport<'a>(&'a Report);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(
            f,
            "{} | month: {} | day: {} | {} trip(s)",
            title_case(&r.city),
            r.month,
            r.day,
            r.trips
        )?;
        rule(f)?;

        section(f, "Most Frequent Times of Travel")?;
        outcome(f, &r.time, "travel time", write_time)?;
        rule(f)?;

        section(f, "Most Popular Stations and Trip")?;
        outcome(f, &r.stations, "station", write_stations)?;
        rule(f)?;

        section(f, "Trip Duration")?;
        outcome(f, &r.durations, "trip duration", write_durations)?;
        rule(f)?;

        section(f, "User Stats")?;
        outcome(f, &r.users, "user", write_users)?;
        rule(f)
    }
}

fn rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{title}\n")
}

fn outcome<T>(
    f: &mut fmt::Formatter<'_>,
    outcome: &Outcome<T>,
    what: &str,
    write: impl Fn(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    match outcome {
        Outcome::Computed(value) => write(f, value),
        Outcome::SchemaUnavailable => writeln!(f, "Sorry! No {what} data available."),
        Outcome::NoData => writeln!(f, "No {what} data in the selected trips."),
    }
}

fn write_time(f: &mut fmt::Formatter<'_>, t: &TimeStats) -> fmt::Result {
    writeln!(f, "Most popular month: {}", t.month_name())?;
    writeln!(f, "Most popular day: {}", t.weekday_name())?;
    writeln!(f, "Most popular starting hour: {}", t.hour)
}

fn write_stations(f: &mut fmt::Formatter<'_>, s: &StationStats) -> fmt::Result {
    writeln!(f, "Most popular start station: {}", s.top_start)?;
    writeln!(f, "Most popular end station: {}", s.top_end)?;
    writeln!(f, "Most popular trip: {}", s.top_pair)
}

fn write_durations(f: &mut fmt::Formatter<'_>, d: &DurationStats) -> fmt::Result {
    writeln!(f, "Total travel time: {}", d.total.formatted)?;
    writeln!(f, "Mean travel time: {}", d.mean.formatted)
}

fn write_users(f: &mut fmt::Formatter<'_>, u: &UserStats) -> fmt::Result {
    writeln!(f, "User types:")?;
    outcome(f, &u.user_types, "user type", |f, c| write_counts(f, c, "user type"))?;
    writeln!(f)?;
    writeln!(f, "Genders:")?;
    outcome(f, &u.genders, "gender", |f, c| write_counts(f, c, "gender"))?;
    writeln!(f)?;
    outcome(f, &u.birth_years, "birth year", write_birth_years)
}

fn write_counts(f: &mut fmt::Formatter<'_>, c: &CategoryCounts, what: &str) -> fmt::Result {
    let width = c.counts.iter().map(|e| e.category.len()).max().unwrap_or(0);
    for entry in &c.counts {
        writeln!(f, "  {:<width$}  {}", entry.category, entry.count)?;
    }
    if c.missing > 0 {
        writeln!(f, "No {what} given for {} trip(s).", c.missing)?;
    }
    Ok(())
}

fn write_birth_years(f: &mut fmt::Formatter<'_>, b: &BirthYearStats) -> fmt::Result {
    if b.missing > 0 {
        writeln!(
            f,
            "{} trip(s) have no birth year and are left out below.",
            b.missing
        )?;
    }
    let Outcome::Computed(profile) = &b.profile else {
        return writeln!(f, "No birth year data in the selected trips.");
    };

    write!(f, "Earliest year of birth: {}", profile.earliest.year)?;
    write_note(f, profile.earliest.note)?;
    write!(f, "Most recent year of birth: {}", profile.latest.year)?;
    write_note(f, profile.latest.note)?;

    match &profile.mode {
        BirthYearMode::Single(year) => writeln!(f, "Most common year of birth: {year}"),
        BirthYearMode::Tied(years) => {
            let list: Vec<String> = years.iter().map(i32::to_string).collect();
            writeln!(f, "Most common years of birth (tied): {}", list.join(", "))
        }
    }
}

fn write_note(f: &mut fmt::Formatter<'_>, note: Option<AgeNote>) -> fmt::Result {
    match note {
        Some(AgeNote::ExtremeAge { age }) => {
            writeln!(f, "  (pretty old for riding a bike at {age} years of age!)")
        }
        Some(AgeNote::ExtremeYouth { age }) => {
            writeln!(f, "  (pretty young for hiring a bike at {age} year(s) of age!)")
        }
        None => writeln!(f),
    }
}

/// Renders one page of raw records as CSV, limited to the dataset's columns.
pub fn render_page(schema: &Schema, records: &[TripRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header = vec!["Start Time"];
    if schema.end_time {
        header.push("End Time");
    }
    if schema.trip_duration {
        header.push("Trip Duration");
    }
    if schema.stations {
        header.extend(["Start Station", "End Station"]);
    }
    if schema.user_type {
        header.push("User Type");
    }
    if schema.gender {
        header.push("Gender");
    }
    if schema.birth_year {
        header.push("Birth Year");
    }
    writer.write_record(&header)?;

    for r in records {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let mut row = vec![r.start_time.format(TIMESTAMP_FORMAT).to_string()];
        if schema.end_time {
            row.push(
                r.end_time
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
            );
        }
        if schema.trip_duration {
            row.push(r.trip_duration.map(|d| d.to_string()).unwrap_or_default());
        }
        if schema.stations {
            row.push(text(&r.start_station));
            row.push(text(&r.end_station));
        }
        if schema.user_type {
            row.push(text(&r.user_type));
        }
        if schema.gender {
            row.push(text(&r.gender));
        }
        if schema.birth_year {
            row.push(r.birth_year.map(|y| y.to_string()).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// One flattened report, as appended to a summary CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub generated_at: DateTime<Utc>,
    pub city: String,
    pub month: String,
    pub day: String,
    pub trips: usize,
    pub top_month: Option<String>,
    pub top_day: Option<String>,
    pub top_hour: Option<String>,
    pub top_start_station: Option<String>,
    pub top_end_station: Option<String>,
    pub top_trip: Option<String>,
    pub total_duration_secs: Option<f64>,
    pub mean_duration_secs: Option<f64>,
    pub earliest_birth_year: Option<i32>,
    pub latest_birth_year: Option<i32>,
    /// Tied years joined with `;`.
    pub common_birth_year: Option<String>,
}

impl SummaryRow {
    pub fn from_report(report: &Report) -> Self {
        let time = report.time.as_ref().computed();
        let stations = report.stations.as_ref().computed();
        let durations = report.durations.as_ref().computed();
        let profile = report
            .users
            .as_ref()
            .computed()
            .and_then(|u| u.birth_years.as_ref().computed())
            .and_then(|b| b.profile.as_ref().computed());

        SummaryRow {
            generated_at: Utc::now(),
            city: report.city.clone(),
            month: report.month.to_string(),
            day: report.day.to_string(),
            trips: report.trips,
            top_month: time.map(|t| t.month_name().to_string()),
            top_day: time.map(|t| t.weekday_name().to_string()),
            top_hour: time.map(|t| t.hour.to_string()),
            top_start_station: stations.map(|s| s.top_start.clone()),
            top_end_station: stations.map(|s| s.top_end.clone()),
            top_trip: stations.map(|s| s.top_pair.clone()),
            total_duration_secs: durations.map(|d| d.total.value),
            mean_duration_secs: durations.map(|d| d.mean.value),
            earliest_birth_year: profile.map(|p| p.earliest.year),
            latest_birth_year: profile.map(|p| p.latest.year),
            common_birth_year: profile.map(|p| match &p.mode {
                BirthYearMode::Single(y) => y.to_string(),
                BirthYearMode::Tied(ys) => ys
                    .iter()
                    .map(i32::to_string)
                    .collect::<Vec<_>>()
                    .join(";"),
            }),
        }
    }
}

/// Appends a [`SummaryRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &Path, row: &SummaryRow) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // header only on a fresh file
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DayFilter, MonthFilter};
    use crate::model::Table;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_report());
    }

    #[test]
    fn test_render_json_has_sections() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&sample_report()).unwrap()).unwrap();
        assert_eq!(json["city"], "chicago");
        assert_eq!(json["time"]["status"], "computed");
        assert_eq!(json["stations"]["value"]["top_start"], "Canal St");
        assert_eq!(
            json["users"]["value"]["genders"]["status"],
            "schema_unavailable"
        );
    }

    #[test]
    fn test_render_report_text() {
        let text = render_report(&sample_report());

        assert!(text.starts_with("Chicago | month: All | day: All | 3 trip(s)"));
        assert!(text.contains("Most popular month: March"));
        assert!(text.contains("Most popular starting hour: 08:00 to 09:00"));
        assert!(text.contains("Most popular trip: Canal St to Clark St"));
        assert!(text.contains("Total travel time: 1 hour(s) 3 min(s) 40.00 sec(s)"));
        assert!(text.contains("Sorry! No gender data available."));
        assert!(text.contains("Most common years of birth (tied): 1980, 1990"));
        assert!(text.contains("1 trip(s) have no birth year"));
    }

    #[test]
    fn test_render_report_for_empty_selection() {
        let table = Table::empty(Schema::full());
        let report = Report::compute("washington", MonthFilter::Only(2), DayFilter::All, &table, 2017);
        let text = render_report(&report);

        assert!(text.contains("Washington | month: February"));
        assert!(text.contains("No travel time data in the selected trips."));
        assert!(text.contains("No user data in the selected trips."));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york city"), "New York City");
        assert_eq!(title_case("CHICAGO"), "Chicago");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_render_page_uses_schema_columns() {
        let schema = Schema {
            gender: false,
            birth_year: false,
            ..Schema::full()
        };
        let page = render_page(&schema, &sample_records()[..2]).unwrap();
        let lines: Vec<_> = page.lines().collect();

        assert_eq!(
            lines[0],
            "Start Time,End Time,Trip Duration,Start Station,End Station,User Type"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2017-03-06 08:10:00,,1000,Canal St,Clark St"));
    }

    #[test]
    fn test_summary_row_from_report() {
        let row = SummaryRow::from_report(&sample_report());
        assert_eq!(row.top_month.as_deref(), Some("March"));
        assert_eq!(row.total_duration_secs, Some(3820.0));
        assert_eq!(row.common_birth_year.as_deref(), Some("1980;1990"));
    }

    #[test]
    fn test_append_summary_writes_header_once() {
        let path = env::temp_dir().join("bikeshare_stats_test_summary.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let row = SummaryRow::from_report(&sample_report());
        append_summary(&path, &row).unwrap();
        append_summary(&path, &row).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 data rows
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("generated_at")).count(),
            1
        );

        fs::remove_file(&path).unwrap();
    }

    // Helper functions for tests
    fn sample_records() -> Vec<TripRecord> {
        let at = |d: u32| {
            NaiveDate::from_ymd_opt(2017, 3, d)
                .unwrap()
                .and_hms_opt(8, 10, 0)
                .unwrap()
        };
        let trip = |d: u32, secs: f64, year: Option<i32>| TripRecord {
            trip_duration: Some(secs),
            start_station: Some("Canal St".to_string()),
            end_station: Some("Clark St".to_string()),
            user_type: Some("Subscriber".to_string()),
            birth_year: year,
            ..TripRecord::starting_at(at(d))
        };
        vec![
            trip(6, 1000.0, Some(1980)),
            trip(7, 1500.0, Some(1990)),
            trip(8, 1320.0, None),
        ]
    }

    fn sample_report() -> Report {
        let schema = Schema {
            end_time: false,
            gender: false,
            ..Schema::full()
        };
        let table = Table::new(schema, sample_records());
        Report::compute("chicago", MonthFilter::All, DayFilter::All, &table, 2017)
    }
}
