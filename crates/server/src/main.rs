//! Single-run worker process.
//!
//! Executes one prepared run and reports its lifecycle on stdout, one event
//! per line (`main:run-start:<id>`, `main:run-done:<id>`), so a parent
//! process can follow it without sharing memory. Logs go to stderr.
//! Exits non-zero when the run fails; `run-done` is then never printed.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::Dataset;
use generator::RecommendationGenerator;
use pipeline::{PipelineConfig, RunEvent, RunExecutor, RunId, RunPreparer, SignalSink};
use resolver::PlaylistResolver;

#[derive(Parser)]
#[command(name = "playlist-worker")]
#[command(about = "Execute a single playlist recommendation run", long_about = None)]
struct Args {
    /// Run to execute
    #[arg(long)]
    run_id: RunId,

    /// Prepare `input.json` from `request.json` before executing
    #[arg(long)]
    prepare: bool,

    /// TOML configuration file
    #[arg(long, env = "PLAYLIST_RECS_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset JSON (overrides the config file)
    #[arg(long, env = "PLAYLIST_RECS_DATASET")]
    dataset: Option<PathBuf>,

    /// Root directory of run directories (overrides the config file)
    #[arg(long, env = "PLAYLIST_RECS_RUNS_DIR")]
    runs_dir: Option<PathBuf>,
}

/// Prints each event as a line on stdout
struct StdoutSink;

impl SignalSink for StdoutSink {
    fn emit(&self, event: RunEvent) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", event).and_then(|_| stdout.flush()) {
            warn!("Failed to write event {}: {}", event, e);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(dataset) = args.dataset {
        config.dataset_path = dataset;
    }
    if let Some(runs_dir) = args.runs_dir {
        config.runs_dir = runs_dir;
    }
    let registry = config.registry();

    if args.prepare {
        let dataset = Dataset::load_validated(&config.dataset_path).with_context(|| {
            format!("Failed to load dataset {}", config.dataset_path.display())
        })?;
        let preparer = RunPreparer::new(registry.clone(), PlaylistResolver::new(Arc::new(dataset)))
            .with_write_mode(config.write_mode());
        preparer
            .prepare(&args.run_id)
            .with_context(|| format!("Failed to prepare run {}", args.run_id))?;
    }

    let generator: Arc<dyn RecommendationGenerator> = Arc::new(config.generator.build());
    let executor = RunExecutor::new(registry, generator).with_write_mode(config.write_mode());

    info!("Worker executing run {}", args.run_id);
    let output = executor
        .execute(&args.run_id, &StdoutSink)
        .with_context(|| format!("Run {} failed", args.run_id))?;
    info!(
        "Run {} produced {} results in {:.2}s",
        output.run_id,
        output.results.len(),
        output.ts_profile.ts_total_length
    );

    Ok(())
}
