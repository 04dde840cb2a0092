//! Rider statistics: user types, genders and birth years.

use serde::Serialize;
use tracing::debug;

use super::Outcome;
use super::utility::{frequencies, modes};
use crate::model::{Table, TripRecord};

/// Birth years at or before this get an extreme-age note.
pub const EXTREME_AGE_BIRTH_YEAR: i32 = 1920;
/// Birth years at or after this get an extreme-youth note.
pub const EXTREME_YOUTH_BIRTH_YEAR: i32 = 2015;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Counts per distinct value of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    /// Most frequent first; equal counts by name.
    pub counts: Vec<CategoryCount>,
    /// Records with no value in this column.
    pub missing: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgeNote {
    ExtremeAge { age: i32 },
    ExtremeYouth { age: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearExtreme {
    pub year: i32,
    pub note: Option<AgeNote>,
}

/// Most common birth year; ties are reported in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthYearMode {
    Single(i32),
    /// Ascending.
    Tied(Vec<i32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearProfile {
    pub earliest: BirthYearExtreme,
    pub latest: BirthYearExtreme,
    pub mode: BirthYearMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub missing: usize,
    /// Computed over the records that have a birth year.
    pub profile: Outcome<BirthYearProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_types: Outcome<CategoryCounts>,
    pub genders: Outcome<CategoryCounts>,
    pub birth_years: Outcome<BirthYearStats>,
}

/// Rider breakdowns for a filtered table.
///
/// `reference_year` is the "current" year used to turn extreme birth years
/// into ages.
#[tracing::instrument(skip(table), fields(trips = table.len()))]
pub fn user_stats(table: &Table, reference_year: i32) -> Outcome<UserStats> {
    if table.is_empty() {
        return Outcome::NoData;
    }

    let schema = table.schema();
    let records = table.records();

    Outcome::Computed(UserStats {
        user_types: category_counts(schema.user_type, records, |r| r.user_type.as_deref()),
        genders: category_counts(schema.gender, records, |r| r.gender.as_deref()),
        birth_years: if schema.birth_year {
            Outcome::Computed(birth_year_stats(records, reference_year))
        } else {
            debug!("Dataset has no birth year column");
            Outcome::SchemaUnavailable
        },
    })
}

fn category_counts(
    present: bool,
    records: &[TripRecord],
    value: impl Fn(&TripRecord) -> Option<&str>,
) -> Outcome<CategoryCounts> {
    if !present {
        return Outcome::SchemaUnavailable;
    }

    let missing = records.iter().filter(|&r| value(r).is_none()).count();
    let mut counts: Vec<CategoryCount> = frequencies(records.iter().filter_map(&value))
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

    Outcome::Computed(CategoryCounts { counts, missing })
}

fn birth_year_stats(records: &[TripRecord], reference_year: i32) -> BirthYearStats {
    let years: Vec<i32> = records.iter().filter_map(|r| r.birth_year).collect();
    let missing = records.len() - years.len();
    if missing > 0 {
        debug!(missing, "Trips without birth year left out of birth year stats");
    }

    let profile = match (years.iter().min(), years.iter().max()) {
        (Some(&earliest), Some(&latest)) => {
            let tied = modes(years.iter().copied());
            let mode = match tied.as_slice() {
                [single] => BirthYearMode::Single(*single),
                _ => BirthYearMode::Tied(tied),
            };
            Outcome::Computed(BirthYearProfile {
                earliest: BirthYearExtreme {
                    year: earliest,
                    note: (earliest <= EXTREME_AGE_BIRTH_YEAR).then(|| AgeNote::ExtremeAge {
                        age: reference_year - earliest,
                    }),
                },
                latest: BirthYearExtreme {
                    year: latest,
                    note: (latest >= EXTREME_YOUTH_BIRTH_YEAR).then(|| AgeNote::ExtremeYouth {
                        age: reference_year - latest,
                    }),
                },
                mode,
            })
        }
        _ => Outcome::NoData,
    };

    BirthYearStats { missing, profile }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Schema;
    use chrono::NaiveDate;

    #[test]
    fn test_birth_year_tie_reports_all_years() {
        let mut years = vec![Some(1990); 3];
        years.extend([Some(1995); 3]);
        years.push(Some(2000));
        let table = table_of(&years);

        let profile = birth_profile(&table);
        assert_eq!(profile.mode, BirthYearMode::Tied(vec![1990, 1995]));
    }

    #[test]
    fn test_birth_year_single_mode() {
        let table = table_of(&[Some(1985), Some(1985), Some(1992)]);
        assert_eq!(birth_profile(&table).mode, BirthYearMode::Single(1985));
    }

    #[test]
    fn test_birth_year_missing_counted_then_excluded() {
        let table = table_of(&[None, Some(1970), None, Some(1980)]);
        let stats = user_stats(&table, 2017).computed().unwrap();
        let birth_years = stats.birth_years.computed().unwrap();

        assert_eq!(birth_years.missing, 2);
        let profile = birth_years.profile.computed().unwrap();
        assert_eq!(profile.earliest.year, 1970);
        assert_eq!(profile.latest.year, 1980);
        assert_eq!(profile.mode, BirthYearMode::Tied(vec![1970, 1980]));
    }

    #[test]
    fn test_extreme_age_and_youth_notes() {
        let table = table_of(&[Some(1899), Some(1975), Some(2016)]);
        let profile = birth_profile(&table);

        assert_eq!(profile.earliest.note, Some(AgeNote::ExtremeAge { age: 118 }));
        assert_eq!(profile.latest.note, Some(AgeNote::ExtremeYouth { age: 1 }));
    }

    #[test]
    fn test_note_thresholds_inclusive() {
        let profile = birth_profile(&table_of(&[Some(1920), Some(2015)]));
        assert!(profile.earliest.note.is_some());
        assert!(profile.latest.note.is_some());

        let profile = birth_profile(&table_of(&[Some(1921), Some(2014)]));
        assert_eq!(profile.earliest.note, None);
        assert_eq!(profile.latest.note, None);
    }

    #[test]
    fn test_all_birth_years_missing() {
        let table = table_of(&[None, None]);
        let birth_years = user_stats(&table, 2017)
            .computed()
            .unwrap()
            .birth_years
            .computed()
            .unwrap();
        assert_eq!(birth_years.missing, 2);
        assert_eq!(birth_years.profile, Outcome::NoData);
    }

    #[test]
    fn test_category_counts_with_missing() {
        let records = vec![
            with_user("Subscriber", Some("Male")),
            with_user("Customer", None),
            with_user("Subscriber", Some("Female")),
            with_user("Subscriber", Some("Male")),
            TripRecord {
                gender: Some("Female".to_string()),
                ..trip()
            },
        ];
        let table = Table::new(Schema::full(), records);
        let stats = user_stats(&table, 2017).computed().unwrap();

        let user_types = stats.user_types.computed().unwrap();
        assert_eq!(
            user_types.counts,
            vec![count("Subscriber", 3), count("Customer", 1)]
        );
        assert_eq!(user_types.missing, 1);

        let genders = stats.genders.computed().unwrap();
        // Equal counts are listed by name.
        assert_eq!(genders.counts, vec![count("Female", 2), count("Male", 2)]);
        assert_eq!(genders.missing, 1);
    }

    #[test]
    fn test_absent_columns_are_unavailable() {
        let schema = Schema {
            gender: false,
            birth_year: false,
            ..Schema::full()
        };
        let table = Table::new(schema, vec![with_user("Customer", None)]);
        let stats = user_stats(&table, 2017).computed().unwrap();

        assert!(stats.user_types.is_computed());
        assert_eq!(stats.genders, Outcome::SchemaUnavailable);
        assert_eq!(stats.birth_years, Outcome::SchemaUnavailable);
    }

    #[test]
    fn test_empty_table_is_no_data() {
        assert_eq!(user_stats(&Table::empty(Schema::full()), 2017), Outcome::NoData);
    }

    // Helper functions for tests
    fn trip() -> TripRecord {
        TripRecord::starting_at(
            NaiveDate::from_ymd_opt(2017, 3, 14)
                .unwrap()
                .and_hms_opt(17, 5, 0)
                .unwrap(),
        )
    }

    fn with_user(user_type: &str, gender: Option<&str>) -> TripRecord {
        TripRecord {
            user_type: Some(user_type.to_string()),
            gender: gender.map(str::to_string),
            ..trip()
        }
    }

    fn count(category: &str, count: usize) -> CategoryCount {
        CategoryCount {
            category: category.to_string(),
            count,
        }
    }

    fn table_of(years: &[Option<i32>]) -> Table {
        Table::new(
            Schema::full(),
            years
                .iter()
                .map(|y| TripRecord {
                    birth_year: *y,
                    ..trip()
                })
                .collect(),
        )
    }

    fn birth_profile(table: &Table) -> BirthYearProfile {
        user_stats(table, 2017)
            .computed()
            .unwrap()
            .birth_years
            .computed()
            .unwrap()
            .profile
            .computed()
            .unwrap()
    }
}
