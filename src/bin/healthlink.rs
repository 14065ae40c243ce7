//! Health Link CLI - run the codecs over JSON files
//!
//! Commands:
//! - serialize: Write request JSON to the platform record to insert
//! - deserialize: Raw platform records to normalized results
//! - query: Read query JSON to the platform query shape
//! - permissions: Metric permissions to the platform permission request
//! - units: List units and defaults per metric

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use health_link::types::{HealthMetric, Platform, ReadQuery};
use health_link::units::Unit;
use health_link::{bridge, logging, units, HealthLinkConfig, HEALTH_LINK_VERSION};

/// Health Link - one health data model over HealthKit and Health Connect
#[derive(Parser)]
#[command(name = "healthlink")]
#[command(version = HEALTH_LINK_VERSION)]
#[command(about = "Translate health data between a neutral model and platform stores", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output (default when stdout is a terminal)
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a write request into the record to insert
    Serialize {
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        /// Metric name, e.g. Weight
        #[arg(short, long)]
        metric: String,

        /// Write request file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Normalize raw platform records
    Deserialize {
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        #[arg(short, long)]
        metric: String,

        /// Records file, bare array or {records: [...]} (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Read query JSON, e.g. '{"startDate": "2023-01-01"}'
        #[arg(short, long, default_value = "{}")]
        query: String,

        /// Unit results are expressed in, e.g. kg (overrides the query's unit)
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// Translate a read query into the platform query
    Query {
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        #[arg(short, long)]
        metric: String,

        /// Read query file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Unit to request samples in (overrides the query's unit)
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// Map {read, write} metric lists to the platform permission request
    Permissions {
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        /// Permissions file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// List accepted units and the default unit per metric
    Units {
        /// Only this metric
        #[arg(short, long)]
        metric: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    /// HealthKit
    Ios,
    /// Health Connect
    Android,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Ios => Platform::Ios,
            PlatformArg::Android => Platform::Android,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HealthLinkCliError> {
    let config = match &cli.config {
        Some(path) => HealthLinkConfig::load_from(path)?,
        None => HealthLinkConfig::default(),
    };
    logging::init_with_level(&config.log_level);

    let pretty = cli.pretty || atty::is(atty::Stream::Stdout);

    let output = match cli.command {
        Commands::Serialize {
            platform,
            metric,
            input,
        } => {
            let request = read_input(&input)?;
            bridge::serialize_write(Platform::from(platform).as_str(), &metric, &request)?
        }
        Commands::Deserialize {
            platform,
            metric,
            input,
            query,
            unit,
        } => {
            let records = read_input(&input)?;
            let query = with_unit(&query, unit.as_deref())?;
            bridge::deserialize_read(Platform::from(platform).as_str(), &metric, &query, &records)?
        }
        Commands::Query {
            platform,
            metric,
            input,
            unit,
        } => {
            let query = with_unit(&read_input(&input)?, unit.as_deref())?;
            bridge::translate_query(Platform::from(platform).as_str(), &metric, &query)?
        }
        Commands::Permissions { platform, input } => {
            let permissions = read_input(&input)?;
            bridge::map_permissions(Platform::from(platform).as_str(), &permissions)?
        }
        Commands::Units { metric } => {
            let metrics = match metric {
                Some(name) => vec![name.parse::<HealthMetric>()?],
                None => HealthMetric::ALL.to_vec(),
            };
            serde_json::to_string(&unit_report(&metrics))?
        }
    };

    print_json(&output, pretty)
}

fn read_input(path: &Path) -> Result<String, HealthLinkCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Apply `--unit` on top of a read query
fn with_unit(query_json: &str, unit: Option<&str>) -> Result<String, HealthLinkCliError> {
    let Some(unit) = unit else {
        return Ok(query_json.to_string());
    };
    let mut query: ReadQuery = if query_json.trim().is_empty() {
        ReadQuery::default()
    } else {
        serde_json::from_str(query_json)?
    };
    query.unit = Some(unit.parse::<Unit>()?);
    Ok(serde_json::to_string(&query)?)
}

fn print_json(json: &str, pretty: bool) -> Result<(), HealthLinkCliError> {
    if pretty {
        let value: serde_json::Value = serde_json::from_str(json)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{json}");
    }
    Ok(())
}

fn unit_report(metrics: &[HealthMetric]) -> Vec<UnitReport> {
    metrics
        .iter()
        .map(|metric| UnitReport {
            metric: metric.as_str(),
            units: units::units_for(*metric).iter().map(|u| u.as_str()).collect(),
            default: units::default_unit(*metric).map(|u| u.as_str()),
        })
        .collect()
}

#[derive(serde::Serialize)]
struct UnitReport {
    metric: &'static str,
    units: Vec<&'static str>,
    default: Option<&'static str>,
}

#[derive(Debug)]
enum HealthLinkCliError {
    Io(io::Error),
    Core(health_link::HealthLinkError),
    Json(serde_json::Error),
}

impl From<io::Error> for HealthLinkCliError {
    fn from(e: io::Error) -> Self {
        HealthLinkCliError::Io(e)
    }
}

impl From<health_link::HealthLinkError> for HealthLinkCliError {
    fn from(e: health_link::HealthLinkError) -> Self {
        HealthLinkCliError::Core(e)
    }
}

impl From<serde_json::Error> for HealthLinkCliError {
    fn from(e: serde_json::Error) -> Self {
        HealthLinkCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HealthLinkCliError> for CliError {
    fn from(e: HealthLinkCliError) -> Self {
        use health_link::HealthLinkError;

        match e {
            HealthLinkCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HealthLinkCliError::Json(e) | HealthLinkCliError::Core(HealthLinkError::Json(e)) => {
                CliError {
                    code: "JSON_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some("Check JSON syntax".to_string()),
                }
            }
            HealthLinkCliError::Core(HealthLinkError::UnknownMetric(name)) => CliError {
                code: "UNKNOWN_METRIC".to_string(),
                message: format!("unknown metric: {name}"),
                hint: Some("Run 'healthlink units' to list metrics".to_string()),
            },
            HealthLinkCliError::Core(HealthLinkError::UnknownUnit(name)) => CliError {
                code: "UNKNOWN_UNIT".to_string(),
                message: format!("unknown unit: {name}"),
                hint: Some("Run 'healthlink units' to list units per metric".to_string()),
            },
            HealthLinkCliError::Core(HealthLinkError::Config(message)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message,
                hint: Some("Check the --config file".to_string()),
            },
            HealthLinkCliError::Core(e) => CliError {
                code: "HEALTH_LINK_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_flag_overrides_query_unit() {
        let query = with_unit(r#"{"startDate": "2023-01-01", "unit": "pounds"}"#, Some("KG")).unwrap();
        let query: ReadQuery = serde_json::from_str(&query).unwrap();
        assert_eq!(query.unit, Some(Unit::Kg));
        assert_eq!(query.start_date.as_deref(), Some("2023-01-01"));

        let empty: ReadQuery = serde_json::from_str(&with_unit("", Some("mmolPerL")).unwrap()).unwrap();
        assert_eq!(empty.unit, Some(Unit::MmolPerL));

        assert_eq!(with_unit("{}", None).unwrap(), "{}");
    }

    #[test]
    fn test_unknown_unit_is_reported() {
        let err = with_unit("{}", Some("stone")).unwrap_err();
        let report = CliError::from(err);
        assert_eq!(report.code, "UNKNOWN_UNIT");
    }
}
