//! Reads bike-share trip logs (CSV, optionally gzipped, local or remote) into a [`Table`].

use std::fs::File;
use std::io::{Cursor, Read};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::fetch::{fetch_bytes, is_url};
use crate::model::{Schema, Table, TripRecord};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A CSV row as it appears in the source files.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration", default)]
    trip_duration: Option<f64>,
    #[serde(rename = "Start Station", default)]
    start_station: Option<String>,
    #[serde(rename = "End Station", default)]
    end_station: Option<String>,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    /// Stored as a float (`1989.0`) in the published files.
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

impl RawTrip {
    fn into_record(self) -> Result<TripRecord> {
        let start_time = parse_timestamp(&self.start_time)?;
        let end_time = self.end_time.as_deref().map(parse_timestamp).transpose()?;

        if let Some(d) = self.trip_duration {
            if !d.is_finite() || d < 0.0 {
                bail!("trip duration must be a non-negative number of seconds, got {d}");
            }
        }
        let birth_year = match self.birth_year {
            Some(y) if !y.is_finite() => bail!("invalid birth year {y}"),
            Some(y) => Some(y.trunc() as i32),
            None => None,
        };

        Ok(TripRecord {
            start_time,
            end_time,
            start_station: self.start_station,
            end_station: self.end_station,
            trip_duration: self.trip_duration,
            user_type: self.user_type,
            gender: self.gender,
            birth_year,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .with_context(|| format!("unrecognised timestamp '{value}'"))
}

fn schema_from_headers(headers: &StringRecord) -> Result<Schema> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if !has("Start Time") {
        bail!("trip log has no 'Start Time' column");
    }

    Ok(Schema {
        end_time: has("End Time"),
        stations: has("Start Station") && has("End Station"),
        trip_duration: has("Trip Duration"),
        user_type: has("User Type"),
        gender: has("Gender"),
        birth_year: has("Birth Year"),
    })
}

/// Parses a trip log from any CSV reader.
///
/// The header decides the dataset's [`Schema`]; values in absent columns are
/// never read.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let schema = schema_from_headers(rdr.headers().context("reading CSV header")?)?;

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<RawTrip>().enumerate() {
        let row = i + 1;
        let raw = result.with_context(|| format!("parsing row {row}"))?;
        let mut record = raw
            .into_record()
            .with_context(|| format!("parsing row {row}"))?;

        if !schema.stations {
            record.start_station = None;
            record.end_station = None;
        }
        records.push(record);
    }

    debug!(?schema, "Trip log parsed");
    Ok(Table::new(schema, records))
}

/// Loads a trip log from a file path or an `http(s)://` URL.
///
/// Sources ending in `.gz` are decompressed on the fly.
#[tracing::instrument]
pub fn load_table(source: &str) -> Result<Table> {
    let reader: Box<dyn Read> = if is_url(source) {
        Box::new(Cursor::new(fetch_bytes(source)?))
    } else {
        Box::new(File::open(source).with_context(|| format!("opening {source}"))?)
    };

    let reader: Box<dyn Read> = if source.ends_with(".gz") {
        Box::new(GzDecoder::new(reader))
    } else {
        reader
    };

    let table = read_table(reader).with_context(|| format!("loading trip log {source}"))?;

    let missing = table.schema().missing_columns();
    info!(
        trips = table.len(),
        missing_columns = ?missing,
        "Trip log loaded"
    );
    Ok(table)
}
