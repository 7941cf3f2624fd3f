use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use layoffs_cleaner::config::Config;
use layoffs_cleaner::domain::LayoffRecord;
use layoffs_cleaner::logging;
use layoffs_cleaner::observability;
use layoffs_cleaner::pipeline::ingestion::load_csv;
use layoffs_cleaner::pipeline::output::{write_cleaned, write_reports};
use layoffs_cleaner::pipeline::storage::{InMemoryStorage, Storage};
use layoffs_cleaner::pipeline::{CleaningPipeline, ReportSet};

#[derive(Parser)]
#[command(name = "layoffs_cleaner")]
#[command(about = "Clean a layoffs dataset and derive trend reports")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML configuration file (falls back to $LAYOFFS_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write Prometheus metrics text to this file after the run
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw dataset and write the cleaned CSV
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Clean in memory and write the analytical reports
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Ranks kept per year in the top-companies report
        #[arg(long)]
        top_band: Option<u32>,
    },
    /// Clean, then write both the cleaned CSV and the reports
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        #[arg(long)]
        top_band: Option<u32>,
    },
}

/// Load the input into storage and run the cleaning stages over it
async fn clean(input: &Path, config: &Config) -> Result<Vec<LayoffRecord>> {
    let raw = load_csv(input).with_context(|| format!("loading {}", input.display()))?;

    let storage = Arc::new(InMemoryStorage::new());
    storage.insert_raw(raw).await?;

    let pipeline = CleaningPipeline::new(storage.clone(), config.clone());
    let run = pipeline.run().await?;
    for stage in &run.stages {
        println!(
            "   {:<10} in: {:>6}  out: {:>6}  changed: {:>6}",
            stage.stage, stage.input_rows, stage.output_rows, stage.changed_rows
        );
    }

    Ok(storage.cleaned_records().await?)
}

fn report(cleaned: &[LayoffRecord], config: &Config, output_dir: &Path) -> Result<()> {
    let reports = ReportSet::build(cleaned, config);
    let written = write_reports(&reports, output_dir)?;
    for path in written {
        println!("💾 {}", path.display());
    }
    Ok(())
}

fn with_band(mut config: Config, top_band: Option<u32>) -> Result<Config> {
    if let Some(band) = top_band {
        config.ranking.top_band = band;
        config.validate()?;
    }
    Ok(config)
}

async fn execute(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Clean { input, output_dir } => {
            println!("🔨 Cleaning {}...", input.display());
            let cleaned = clean(&input, &config).await?;
            let path = write_cleaned(&cleaned, &output_dir)?;
            println!("✅ {} cleaned records written to {}", cleaned.len(), path.display());
            Ok(())
        }
        Commands::Report { input, output_dir, top_band } => {
            let config = with_band(config, top_band)?;
            println!("📊 Building reports for {}...", input.display());
            let cleaned = clean(&input, &config).await?;
            report(&cleaned, &config, &output_dir)
        }
        Commands::Run { input, output_dir, top_band } => {
            let config = with_band(config, top_band)?;
            println!("🚀 Running full pipeline for {}...", input.display());
            let cleaned = clean(&input, &config).await?;
            write_cleaned(&cleaned, &output_dir)?;
            report(&cleaned, &config, &output_dir)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = logging::init_logging(&config.logging.dir);

    if cli.metrics_out.is_some() {
        if let Err(e) = observability::install_recorder() {
            error!("Metrics disabled: {}", e);
        }
    }

    let outcome = execute(cli.command, config).await;

    if let Some(path) = cli.metrics_out {
        if let Some(text) = observability::render() {
            std::fs::write(&path, text)
                .with_context(|| format!("writing metrics to {}", path.display()))?;
            info!("Wrote metrics to {}", path.display());
        }
    }

    if let Err(e) = &outcome {
        error!("Pipeline failed: {:#}", e);
    }
    outcome
}
