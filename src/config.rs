//! Runtime settings and the city → trip log catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::fetch::is_url;

/// Age notes use this year when neither a setting nor the data provides one.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2017;

/// Settings read from the environment (after `.env` has been loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory that relative catalog entries resolve against.
    pub data_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub reference_year: Option<i32>,
    pub log_file_path: PathBuf,
}

impl Settings {
    /// Reads `BIKESHARE_DATA_DIR`, `BIKESHARE_CATALOG`,
    /// `BIKESHARE_REFERENCE_YEAR` and `LOG_FILE_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let reference_year = lookup("BIKESHARE_REFERENCE_YEAR")
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .with_context(|| format!("BIKESHARE_REFERENCE_YEAR is not a year: '{v}'"))
            })
            .transpose()?;

        Ok(Settings {
            data_dir: lookup("BIKESHARE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            catalog_path: lookup("BIKESHARE_CATALOG").map(PathBuf::from),
            reference_year,
            log_file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs/bikeshare_stats.log")),
        })
    }

    /// Year used to turn birth years into ages: the configured value, else the
    /// latest trip year in the loaded data, else [`DEFAULT_REFERENCE_YEAR`].
    pub fn reference_year_for(&self, latest_trip_year: Option<i32>) -> i32 {
        self.reference_year
            .or(latest_trip_year)
            .unwrap_or(DEFAULT_REFERENCE_YEAR)
    }
}

/// Maps lowercase city names to trip log sources (file paths or URLs).
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "chicago": "chicago.csv",
///   "boston": "https://example.org/trips/boston.csv.gz"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CityCatalog {
    entries: BTreeMap<String, String>,
}

impl Default for CityCatalog {
    fn default() -> Self {
        let entries = [
            ("chicago", "chicago.csv"),
            ("new york city", "new_york_city.csv"),
            ("washington", "washington.csv"),
        ]
        .into_iter()
        .map(|(city, file)| (city.to_string(), file.to_string()))
        .collect();
        Self { entries }
    }
}

impl CityCatalog {
    /// Loads the catalog from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading city catalog {}", path.display()))?;
        let raw: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("parsing city catalog {}", path.display()))?;
        if raw.is_empty() {
            bail!("city catalog {} lists no cities", path.display());
        }
        let entries = raw
            .into_iter()
            .map(|(city, source)| (normalize(&city), source))
            .collect();
        Ok(Self { entries })
    }

    /// The catalog at `path` if given, otherwise the built-in one.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Looks up a city, ignoring case and surrounding whitespace.
    pub fn get(&self, city: &str) -> Option<&str> {
        self.entries.get(&normalize(city)).map(String::as_str)
    }

    pub fn contains(&self, city: &str) -> bool {
        self.get(city).is_some()
    }

    /// Resolves a city to a loadable source. Relative paths are joined onto
    /// `data_dir`; URLs and absolute paths are returned unchanged.
    pub fn resolve(&self, city: &str, data_dir: &Path) -> Option<String> {
        let source = self.get(city)?;
        if is_url(source) || Path::new(source).is_absolute() {
            return Some(source.to_string());
        }
        Some(data_dir.join(source).to_string_lossy().into_owned())
    }

    /// City names in alphabetical order.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over all `(city, source)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize(city: &str) -> String {
    city.trim().to_lowercase()
}
