//! CLI entry point for the decade summary tool.
//!
//! Provides subcommands for summarizing an audio feature per decade from a
//! CSV dataset and for packaging the project directory into a submission zip.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use decade_summary::{
    dataset::Dataset,
    output::{print_json, print_pretty, write_csv},
    package::package,
    summary::{DECADE_COLUMN, summarize_by},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "decade_summary")]
#[command(about = "Summarize audio features per decade and package submissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute mean, median and std of a feature for each decade
    Summarize {
        /// CSV file holding the dataset
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Numeric column to summarize (e.g. "energy")
        #[arg(short, long)]
        feature: String,

        /// Column to group rows by
        #[arg(short, long, default_value = DECADE_COLUMN)]
        key: String,

        /// Derive the grouping column from this year or date column first
        #[arg(short = 'y', long)]
        year_column: Option<String>,

        /// How to emit the summary
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,

        /// CSV file to write (required with --format csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gzip compress the CSV output
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Zip the project directory into submission/<NAME>.zip
    Package {
        /// Archive name, without extension
        name: String,

        /// Project directory to archive
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/decade_summary.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("decade_summary.log"));

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
        Commands::Summarize {
            input,
            feature,
            key,
            year_column,
            format,
            output,
            gzip,
        } => {
            let mut dataset = Dataset::from_csv_path(&input)?;
            if let Some(year_column) = year_column {
                dataset = dataset.with_decade_column(&year_column, &key)?;
            }

            let summary = summarize_by(&dataset, &key, &feature)?;
            info!(
                feature = %feature,
                key = %key,
                rows = dataset.row_count(),
                groups = summary.len(),
                "Summary computed"
            );

            match format {
                Format::Pretty => print_pretty(&summary),
                Format::Json => print_json(&summary)?,
                Format::Csv => {
                    let Some(output) = output else {
                        bail!("--output is required with --format csv");
                    };
                    let written = write_csv(&output, &summary, gzip)?;
                    info!(path = %written.display(), "Summary CSV written");
                }
            }

            if gzip && !matches!(format, Format::Csv) {
                warn!("--gzip only applies to --format csv, ignoring");
            }
        }
        Commands::Package { name, root } => {
            let report = package(&root, &name)?;
            info!(
                archive = %report.archive.display(),
                files = report.files,
                "Packaging complete"
            );
        }
    }

    Ok(())
}
