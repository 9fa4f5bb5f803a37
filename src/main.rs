//! CLI entry point for the POS analytics tool.
//!
//! Provides subcommands for rendering the full sales report from a POS
//! transaction export and for running only the bill-numbering checks.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pos_analytics::analyzers::affinity::DEFAULT_TOP_PAIRS;
use pos_analytics::analyzers::validation::{
    DEFAULT_MAX_GAP_SPAN, ValidationOptions, validate_bills,
};
use pos_analytics::loader::LoadOptions;
use pos_analytics::output::{
    log_report, log_validation, print_pretty, write_csv_sections, write_json,
};
use pos_analytics::report::{DEFAULT_MOVERS, Report, ReportOptions, load_dataset};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_SOURCE: &str = "PosTransactionDetails.xlsx";

#[derive(Parser)]
#[command(name = "pos_analytics")]
#[command(about = "Sales analytics for POS transaction exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that reads an export.
#[derive(clap::Args)]
struct InputArgs {
    /// Path to the export: CSV (optionally .gz) or a spreadsheet such as .xlsx.
    /// Defaults to $POS_FILE_PATH.
    #[arg(value_name = "FILE")]
    source: Option<PathBuf>,

    /// Explicit chrono format for the tran_date column
    #[arg(long)]
    timestamp_format: Option<String>,

    /// Field delimiter of a CSV export
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Skip gap listing for terminals whose bill range is wider than this
    #[arg(long, default_value_t = DEFAULT_MAX_GAP_SPAN)]
    max_gap_span: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and log every report section, optionally exporting it
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Write the full report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write one CSV file per report section into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Gzip compress the CSV section files
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Number of frequently-bought-together pairs to keep
        #[arg(long, default_value_t = DEFAULT_TOP_PAIRS)]
        top_pairs: usize,

        /// Number of fast and slow movers to list
        #[arg(long, default_value_t = DEFAULT_MOVERS)]
        movers: usize,
    },
    /// Run only the bill-numbering checks; exits non-zero on conflicts or gaps
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },
}

impl InputArgs {
    fn source(&self) -> PathBuf {
        self.source.clone().unwrap_or_else(|| {
            std::env::var("POS_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCE))
        })
    }

    fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = u8::try_from(self.delimiter).with_context(|| {
            format!("delimiter '{}' is not a single-byte character", self.delimiter)
        })?;
        Ok(LoadOptions { delimiter })
    }

    fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            max_gap_span: self.max_gap_span,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/pos_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("pos_analytics.log"));

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
        Commands::Report {
            input,
            json,
            csv_dir,
            gzip,
            top_pairs,
            movers,
        } => {
            let source = input.source();
            let dataset = load_dataset(
                &source,
                &input.load_options()?,
                input.timestamp_format.as_deref(),
            )
            .with_context(|| format!("failed to load {}", source.display()))?;

            let options = ReportOptions {
                top_pairs,
                movers,
                validation: input.validation_options(),
            };
            let report = Report::build(&dataset, &options).context("failed to aggregate report")?;

            log_report(&report);
            print_pretty(&report);

            if let Some(path) = json {
                write_json(&path, &source.to_string_lossy(), &report)?;
            }
            if let Some(dir) = csv_dir {
                write_csv_sections(&dir, &report, gzip)?;
            }
        }
        Commands::Validate { input } => {
            let source = input.source();
            let dataset = load_dataset(
                &source,
                &input.load_options()?,
                input.timestamp_format.as_deref(),
            )
            .with_context(|| format!("failed to load {}", source.display()))?;

            let validation = validate_bills(&dataset.bills, &input.validation_options());
            log_validation(&validation);

            if !validation.is_clean() {
                bail!(
                    "bill validation failed: {} conflicting bill number(s), \
                     {} missing bill number(s), {} terminal(s) with an unchecked range",
                    validation.conflicts.len(),
                    validation.missing_count(),
                    validation.span_exceeded_count()
                );
            }
            info!("Bill numbering is consistent");
        }
    }

    Ok(())
}
