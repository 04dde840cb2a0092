//! Most used start station, end station and start→end trip.

use serde::Serialize;
use tracing::debug;

use super::Outcome;
use super::utility::mode;
use crate::model::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub top_start: String,
    pub top_end: String,
    /// `"<start> to <end>"`.
    pub top_pair: String,
}

/// Station modes. Ties go to the lexicographically smallest name.
///
/// Records missing a station value are skipped for that column; a pair is
/// only formed when both ends are known.
#[tracing::instrument(skip(table), fields(trips = table.len()))]
pub fn station_stats(table: &Table) -> Outcome<StationStats> {
    if !table.schema().stations {
        debug!("Dataset has no station columns");
        return Outcome::SchemaUnavailable;
    }

    let records = table.records();
    let top_start = mode(records.iter().filter_map(|r| r.start_station.as_deref()));
    let top_end = mode(records.iter().filter_map(|r| r.end_station.as_deref()));
    let top_pair = mode(records.iter().filter_map(|r| {
        match (r.start_station.as_deref(), r.end_station.as_deref()) {
            (Some(start), Some(end)) => Some(format!("{start} to {end}")),
            _ => None,
        }
    }));

    match (top_start, top_end, top_pair) {
        (Some(start), Some(end), Some(pair)) => Outcome::Computed(StationStats {
            top_start: start.to_string(),
            top_end: end.to_string(),
            top_pair: pair,
        }),
        _ => Outcome::NoData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Schema, TripRecord};
    use chrono::NaiveDate;

    #[test]
    fn test_station_modes() {
        let table = table_of(&[
            (Some("Canal St"), Some("Clark St")),
            (Some("Canal St"), Some("Lake Shore Dr")),
            (Some("State St"), Some("Lake Shore Dr")),
            (Some("Canal St"), Some("Clark St")),
        ]);
        let stats = station_stats(&table).computed().unwrap();

        assert_eq!(stats.top_start, "Canal St");
        // Clark St and Lake Shore Dr tie at two trips each.
        assert_eq!(stats.top_end, "Clark St");
        assert_eq!(stats.top_pair, "Canal St to Clark St");
    }

    #[test]
    fn test_station_tie_breaks_lexicographically() {
        let table = table_of(&[
            (Some("Wells St"), Some("B")),
            (Some("Ashland Ave"), Some("A")),
        ]);
        let stats = station_stats(&table).computed().unwrap();

        assert_eq!(stats.top_start, "Ashland Ave");
        assert_eq!(stats.top_end, "A");
        assert_eq!(stats.top_pair, "Ashland Ave to A");
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let table = table_of(&[
            (None, Some("Clark St")),
            (None, Some("Clark St")),
            (Some("Canal St"), None),
            (Some("Canal St"), Some("Wabash Ave")),
        ]);
        let stats = station_stats(&table).computed().unwrap();

        assert_eq!(stats.top_start, "Canal St");
        assert_eq!(stats.top_end, "Clark St");
        assert_eq!(stats.top_pair, "Canal St to Wabash Ave");
    }

    #[test]
    fn test_schema_without_stations_is_unavailable() {
        let schema = Schema {
            stations: false,
            ..Schema::full()
        };
        let table = Table::new(schema, vec![trip(None, None)]);
        assert_eq!(station_stats(&table), Outcome::SchemaUnavailable);
    }

    #[test]
    fn test_empty_table_is_no_data() {
        assert_eq!(station_stats(&Table::empty(Schema::full())), Outcome::NoData);
    }

    #[test]
    fn test_all_values_missing_is_no_data() {
        let table = table_of(&[(None, None), (None, None)]);
        assert_eq!(station_stats(&table), Outcome::NoData);
    }

    fn trip(start: Option<&str>, end: Option<&str>) -> TripRecord {
        let start_time = NaiveDate::from_ymd_opt(2017, 4, 12)
            .unwrap()
            .and_hms_opt(7, 45, 0)
            .unwrap();
        TripRecord {
            start_station: start.map(str::to_string),
            end_station: end.map(str::to_string),
            ..TripRecord::starting_at(start_time)
        }
    }

    fn table_of(pairs: &[(Option<&str>, Option<&str>)]) -> Table {
        Table::new(
            Schema::full(),
            pairs.iter().map(|(s, e)| trip(*s, *e)).collect(),
        )
    }
}
