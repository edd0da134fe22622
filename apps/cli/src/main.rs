//! Command-line runner: resolve configuration, install the dual-channel
//! log subscriber, and execute one pipeline run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use subpipe::{logging, Pipeline, PipelineConfig};

/// Subscriber analytics ETL: extract, diff, and load Cademycode student data.
#[derive(Parser)]
#[command(name = "subpipe", version, about)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the source database path.
    #[arg(long)]
    source_db: Option<PathBuf>,

    /// Override the output database path.
    #[arg(long)]
    output_db: Option<PathBuf>,

    /// Override the CSV export path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match PipelineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("subpipe: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    };
    if let Some(path) = cli.source_db {
        config.source_db = path;
    }
    if let Some(path) = cli.output_db {
        config.output_db = path;
    }
    if let Some(path) = cli.csv {
        config.csv_path = path;
    }

    if let Err(e) = logging::init(&config.log_file, &config.changelog_file) {
        eprintln!("subpipe: {e}");
        return ExitCode::FAILURE;
    }

    match Pipeline::new(config).run() {
        Ok(_) => ExitCode::SUCCESS,
        // The runner already logged the failing stage.
        Err(_) => ExitCode::FAILURE,
    }
}
