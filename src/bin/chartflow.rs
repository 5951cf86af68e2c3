//! Chartflow CLI - Command-line interface for Chartflow
//!
//! Commands:
//! - aggregate: Build per-year category trees from ledger rows
//! - validate: Check ledger rows without aggregating
//! - color: Classify labels of an experiment kind
//! - layer: Prepare colored points for a projected layer
//! - config: Print the default configuration file
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use chartflow::aggregator::{DuplicatePolicy, MalformedPolicy};
use chartflow::config::{Config, DEFAULT_CONFIG_FILE};
use chartflow::encoder::{ReportEncoder, REPORT_VERSION};
use chartflow::layers::{
    layer_bounds, layer_numbers, prepare_points_with, select_layer, ColoredPoint, LayerBounds,
    LayerData, ModelData, ModelName,
};
use chartflow::schema::{RawFinancialRecord, RecordAdapter};
use chartflow::types::FinanceReport;
use chartflow::{Classifier, ExperimentKind, FinanceProcessor, CHARTFLOW_VERSION, PRODUCER_NAME};

/// Chartflow - data preparation for budget and model-state charts
#[derive(Parser)]
#[command(name = "chartflow")]
#[command(version = CHARTFLOW_VERSION)]
#[command(about = "Aggregate ledger rows and color experiment labels", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file (defaults to ./chartflow.toml when present)
    #[arg(long, global = true, env = "CHARTFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build per-year category trees from ledger rows
    Aggregate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Only emit this year
        #[arg(long)]
        year: Option<i32>,

        /// Drop malformed rows instead of failing the batch
        #[arg(long)]
        skip_malformed: bool,

        /// Fail when a title code repeats within a year
        #[arg(long)]
        strict_duplicates: bool,
    },

    /// Check ledger rows without aggregating
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify labels of an experiment kind
    Color {
        /// Experiment kind (month, weekday_very, colour, hsv_colour_one_red,
        /// musical_note, musical_note_flat_sharp, or any other tag)
        #[arg(short, long)]
        kind: String,

        /// Labels to classify; together they form the label universe
        #[arg(required = true)]
        labels: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prepare colored points for a projected layer
    Layer {
        /// Layer JSON, or a model/layer map when --model is given (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Model to select from a model/layer map
        #[arg(long, requires = "layer")]
        model: Option<String>,

        /// Layer number to select
        #[arg(long, requires = "model")]
        layer: Option<u32>,
    },

    /// Print the default configuration file
    Config,

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of rows
    Json,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact report JSON
    Json,
    /// Pretty-printed report JSON
    JsonPretty,
    /// One year tree per line
    Ndjson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

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

/// Log to stderr; `RUST_LOG` overrides the flag-derived level.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    // A second init only happens in tests; ignore it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn run(cli: Cli) -> Result<(), ChartflowCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Aggregate {
            input,
            output,
            input_format,
            output_format,
            year,
            skip_malformed,
            strict_duplicates,
        } => {
            let mut config = config;
            if skip_malformed {
                config.aggregation.malformed = MalformedPolicy::Skip;
            }
            if strict_duplicates {
                config.aggregation.duplicates = DuplicatePolicy::Reject;
            }
            cmd_aggregate(&config, &input, &output, input_format, output_format, year)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Color { kind, labels, json } => cmd_color(&config, &kind, &labels, json),

        Commands::Layer {
            input,
            model,
            layer,
        } => cmd_layer(&config, &input, model.as_deref().zip(layer)),

        Commands::Config => {
            print!("{}", Config::default_toml());
            Ok(())
        }

        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, ChartflowCliError> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            Config::load(path)?
        }
        None => Config::load_default()?.unwrap_or_default(),
    };
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, ChartflowCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_rows(
    data: &str,
    input_format: InputFormat,
) -> Result<Vec<RawFinancialRecord>, ChartflowCliError> {
    let rows = match input_format {
        InputFormat::Json => RecordAdapter::parse_array(data)?,
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(data)?,
    };
    Ok(rows)
}

fn cmd_aggregate(
    config: &Config,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    year: Option<i32>,
) -> Result<(), ChartflowCliError> {
    let rows = parse_rows(&read_input(input)?, input_format)?;

    let processor = FinanceProcessor::from_config(config);
    let mut outcome = processor.aggregate_raw(&rows)?;

    if let Some(year) = year {
        outcome.years.retain(|y| y.year == year);
        if outcome.years.is_empty() {
            return Err(ChartflowCliError::NoSuchYear(year));
        }
    }

    let report = ReportEncoder::new().encode(&outcome);
    info!(years = report.years.len(), "writing report");

    let output_data = format_output(&report, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), ChartflowCliError> {
    let rows = parse_rows(&read_input(input)?, input_format)?;
    let results = RecordAdapter::validate_records(&rows);

    let report = ValidationReport {
        total_rows: rows.len(),
        valid_rows: rows.len() - results.len(),
        invalid_rows: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                title_code: r.title_code.clone(),
                error: r.defect.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Title {} (index {}): {}",
                    err.title_code.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_rows > 0 {
        Err(ChartflowCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_color(
    config: &Config,
    kind: &str,
    labels: &[String],
    json: bool,
) -> Result<(), ChartflowCliError> {
    let classifier = Classifier::from_config(&config.classifier)?;
    let kind = ExperimentKind::from_name(kind);

    let assignments: Vec<LabelColor> = labels
        .iter()
        .map(|label| LabelColor {
            label: label.clone(),
            color: classifier
                .color_for(&kind, label, Some(labels))
                .to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&assignments)?);
    } else {
        for a in &assignments {
            println!("{}\t{}", a.color, a.label);
        }
    }

    Ok(())
}

fn cmd_layer(
    config: &Config,
    input: &Path,
    selection: Option<(&str, u32)>,
) -> Result<(), ChartflowCliError> {
    let data = read_input(input)?;

    let layer: LayerData = match selection {
        Some((model, number)) => {
            let models: ModelData = serde_json::from_str(&data)?;
            if let Some(known) = ModelName::from_name(model) {
                if !known.has_layer(number) {
                    return Err(ChartflowCliError::NoSuchLayer {
                        model: model.to_string(),
                        layer: number,
                        available: known.layers().collect(),
                    });
                }
            }
            match select_layer(&models, model, number) {
                Some(layer) => layer.clone(),
                None => {
                    return Err(ChartflowCliError::NoSuchLayer {
                        model: model.to_string(),
                        layer: number,
                        available: models.get(model).map(layer_numbers).unwrap_or_default(),
                    })
                }
            }
        }
        None => serde_json::from_str(&data)?,
    };

    let classifier = Classifier::from_config(&config.classifier)?;
    let points = prepare_points_with(&classifier, &layer)?;
    let view = LayerView {
        experiment: layer.experiment_name.display_name(),
        model: layer.model_name.clone(),
        bounds: layer_bounds(&points),
        points,
    };

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), ChartflowCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "chartflow_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Chartflow version {}", CHARTFLOW_VERSION),
    });

    checks.push(DoctorCheck {
        name: "report_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {}", REPORT_VERSION),
    });

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let config_check = if path.exists() {
        match Config::load(path) {
            Ok(config) => match Classifier::from_config(&config.classifier) {
                Ok(_) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} is valid", path.display()),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        }
    } else if config_path.is_some() {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: format!("{} does not exist", path.display()),
        }
    } else {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!("No {} found, using defaults", DEFAULT_CONFIG_FILE),
        }
    };
    checks.push(config_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass rows with -i <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (-i - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CHARTFLOW_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Chartflow Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ChartflowCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn format_output(report: &FinanceReport, format: &OutputFormat) -> Result<String, ChartflowCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for year in &report.years {
                lines.push(serde_json::to_string(year)?);
            }
            Ok(lines.join("\n") + "\n")
        }
    }
}

// Error types

#[derive(Debug)]
enum ChartflowCliError {
    Io(io::Error),
    Compute(chartflow::ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    NoSuchYear(i32),
    NoSuchLayer {
        model: String,
        layer: u32,
        available: Vec<u32>,
    },
    DoctorFailed,
}

impl From<io::Error> for ChartflowCliError {
    fn from(e: io::Error) -> Self {
        ChartflowCliError::Io(e)
    }
}

impl From<chartflow::ComputeError> for ChartflowCliError {
    fn from(e: chartflow::ComputeError) -> Self {
        ChartflowCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ChartflowCliError {
    fn from(e: serde_json::Error) -> Self {
        ChartflowCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ChartflowCliError> for CliError {
    fn from(e: ChartflowCliError) -> Self {
        use chartflow::ComputeError;

        match e {
            ChartflowCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ChartflowCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::MalformedRecord { .. } => (
                        "MALFORMED_RECORD",
                        "Run 'chartflow validate' for details, or pass --skip-malformed",
                    ),
                    ComputeError::DuplicateTitle { .. } => (
                        "DUPLICATE_TITLE",
                        "Drop --strict-duplicates to keep the last row per title",
                    ),
                    ComputeError::ConfigError(_) => (
                        "CONFIG_ERROR",
                        "Run 'chartflow config' to see a valid configuration",
                    ),
                    _ => ("PARSE_ERROR", "Check input format"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ChartflowCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ChartflowCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            ChartflowCliError::NoSuchYear(year) => CliError {
                code: "NO_SUCH_YEAR".to_string(),
                message: format!("No rows for year {}", year),
                hint: None,
            },
            ChartflowCliError::NoSuchLayer {
                model,
                layer,
                available,
            } => CliError {
                code: "NO_SUCH_LAYER".to_string(),
                message: format!("No layer {} for model {}", layer, model),
                hint: Some(format!("Available layers: {:?}", available)),
            },
            ChartflowCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    title_code: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct LabelColor {
    label: String,
    color: String,
}

#[derive(serde::Serialize)]
struct LayerView {
    experiment: String,
    model: String,
    bounds: Option<LayerBounds>,
    points: Vec<ColoredPoint>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
