use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use entigen_core::ConfigDocument;
use entigen_generate::output::{write_entities_csv, write_entities_json};
use entigen_generate::{GenerateOptions, GenerationEngine, GenerationError};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] entigen_core::Error),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "entigen",
    version,
    about = "Generates fake entities from a tabular rule document"
)]
struct Cli {
    /// Rule document (.toml or .json).
    config: PathBuf,
    /// Output directory for result files.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
    /// RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the document's targetType.
    #[arg(long)]
    target_type: Option<String>,
    /// Override the document's numberToGenerate.
    #[arg(long)]
    count: Option<u64>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    info!(config = %cli.config.display(), "loading rule document");
    let document = ConfigDocument::from_path(&cli.config)?;

    let options = GenerateOptions {
        seed: cli.seed,
        today: None,
    };
    let mut engine = GenerationEngine::new(document, options)?;

    let target_type = cli
        .target_type
        .or_else(|| engine.target_type())
        .ok_or_else(|| {
            CliError::InvalidArgs(
                "targetType is missing; set it in the document or pass --target-type".to_string(),
            )
        })?;
    let passes = cli.count.unwrap_or_else(|| engine.requested_count());

    info!(target_type = %target_type, passes, "starting generation");
    let entities = engine.run_passes(&target_type, passes)?;

    std::fs::create_dir_all(&cli.out_dir)?;
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let json_path = cli.out_dir.join(format!("result_{stamp}.json"));
    let csv_path = cli.out_dir.join(format!("result_{stamp}.csv"));

    let field_order = engine.field_order();
    let json_bytes = write_entities_json(&json_path, &entities)?;
    let csv_bytes = write_entities_csv(&csv_path, &entities, &field_order)?;

    let summary = engine.summary();
    info!(
        entities = entities.len(),
        passes = summary.passes,
        skipped = summary.specs_skipped,
        scripts_compiled = summary.scripts_compiled,
        bytes_written = json_bytes + csv_bytes,
        json = %json_path.display(),
        csv = %csv_path.display(),
        "generation finished"
    );

    Ok(())
}
