//! CLI entry point for the bike-share statistics tool.
//!
//! Provides subcommands for a one-shot report on a city or trip log, an
//! interactive explore session, and listing the configured cities.

use anyhow::{Context, Result};
use bikeshare_stats::config::{CityCatalog, Settings};
use bikeshare_stats::fetch::is_url;
use bikeshare_stats::filter::{DayFilter, MonthFilter, filter};
use bikeshare_stats::loader::load_table;
use bikeshare_stats::output::{
    SummaryRow, append_summary, print_pretty, render_json, render_report,
};
use bikeshare_stats::prompt::{Prompter, explore};
use bikeshare_stats::stats::Report;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Descriptive statistics for bike-share trip logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute statistics for a city from the catalog, or a trip log file or URL
    Stats {
        /// Catalog city name, path to a CSV (optionally .gz) or URL
        #[arg(value_name = "CITY_OR_FILE")]
        source: String,

        /// Month name, number 1-12, or "all"
        #[arg(short, long, default_value = "all")]
        month: MonthFilter,

        /// Weekday name, or "all"
        #[arg(short, long, default_value = "all")]
        day: DayFilter,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Optional: CSV file to append a one-line summary to
        #[arg(long)]
        append_csv: Option<PathBuf>,

        /// Year used to compute rider ages (defaults to the data's latest year)
        #[arg(long)]
        reference_year: Option<i32>,

        /// JSON file mapping city names to trip logs
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Interactively choose a city, month and day, then browse the results
    Explore {
        /// JSON file mapping city names to trip logs
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Year used to compute rider ages (defaults to the data's latest year)
        #[arg(long)]
        reference_year: Option<i32>,
    },
    /// List the cities in the catalog
    Cities {
        /// JSON file mapping city names to trip logs
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let mut settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"))
        .to_path_buf();
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"))
        .to_os_string();

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            source,
            month,
            day,
            format,
            append_csv,
            reference_year,
            catalog,
        } => {
            if reference_year.is_some() {
                settings.reference_year = reference_year;
            }
            let catalog = load_catalog(catalog, &settings)?;
            let (city, location) = resolve_source(&catalog, &settings, &source);

            let table = load_table(&location)?;
            let reference_year = settings.reference_year_for(table.latest_year());
            let filtered = filter(&table, month, day);
            let report = Report::compute(&city, month, day, &filtered, reference_year);
            print_pretty(&report);

            match format {
                Format::Text => println!("{}", render_report(&report)),
                Format::Json => println!("{}", render_json(&report)?),
            }

            if let Some(path) = append_csv {
                append_summary(&path, &SummaryRow::from_report(&report))
                    .with_context(|| format!("appending summary to {}", path.display()))?;
                info!(path = %path.display(), "Summary appended");
            }
        }
        Commands::Explore {
            catalog,
            reference_year,
        } => {
            if reference_year.is_some() {
                settings.reference_year = reference_year;
            }
            let catalog = load_catalog(catalog, &settings)?;
            let stdin = std::io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
            explore(&mut prompter, &catalog, &settings, load_table)?;
        }
        Commands::Cities { catalog } => {
            let catalog = load_catalog(catalog, &settings)?;

            for (city, _) in catalog.iter() {
                let location = catalog
                    .resolve(city, &settings.data_dir)
                    .unwrap_or_default();
                let available = is_url(&location) || Path::new(&location).exists();
                info!(city, source = %location, available, "City");
            }
            info!(total = catalog.iter().count(), "City list");
        }
    }

    Ok(())
}

/// CLI catalog flag, else `BIKESHARE_CATALOG`, else the built-in cities.
fn load_catalog(flag: Option<PathBuf>, settings: &Settings) -> Result<CityCatalog> {
    let path = flag.or_else(|| settings.catalog_path.clone());
    CityCatalog::load_or_default(path.as_deref())
}

/// Maps a `stats` argument to a display name and a loadable location.
///
/// Catalog cities win; anything else is taken as a path or URL as given.
fn resolve_source(catalog: &CityCatalog, settings: &Settings, source: &str) -> (String, String) {
    if let Some(location) = catalog.resolve(source, &settings.data_dir) {
        debug!(city = source, %location, "Resolved city from catalog");
        return (source.trim().to_lowercase(), location);
    }
    let name = Path::new(source)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split('.').next().unwrap_or(n).replace('_', " "))
        .unwrap_or_else(|| source.to_string());
    (name, source.to_string())
}
