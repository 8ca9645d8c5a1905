use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Dataset, PlaylistId};
use pipeline::{
    PipelineConfig, RunEvent, RunExecutor, RunId, RunPreparer, RunRequest, SignalSink,
};
use rand::seq::{IndexedRandom, IteratorRandom};
use resolver::PlaylistResolver;
use server::RunOrchestrator;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// PlaylistRecs - Playlist Recommendation Pipeline
#[derive(Parser)]
#[command(name = "playlist-recs")]
#[command(about = "Prepare and execute playlist recommendation runs", long_about = None)]
struct Cli {
    /// Path to the dataset JSON document
    #[arg(long, global = true, env = "PLAYLIST_RECS_DATASET")]
    dataset: Option<PathBuf>,

    /// Root directory holding one directory per run
    #[arg(long, global = true, env = "PLAYLIST_RECS_RUNS_DIR")]
    runs_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, env = "PLAYLIST_RECS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write request.json for a new run
    Submit {
        #[arg(long)]
        run_id: RunId,

        /// Model the run should use
        #[arg(long)]
        model: String,

        /// Target playlist id (repeatable)
        #[arg(long = "playlist")]
        playlists: Vec<String>,

        /// Selected genre (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
    },

    /// Resolve request.json into input.json
    Prepare {
        #[arg(long)]
        run_id: RunId,
    },

    /// Execute a prepared run in this process
    Execute {
        #[arg(long)]
        run_id: RunId,
    },

    /// Prepare and execute a run through the orchestrator
    Run {
        #[arg(long)]
        run_id: RunId,
    },

    /// List the genres of the dataset
    Genres,

    /// Show how a genre selection resolves to playlists
    Resolve {
        /// Selected genre (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
    },

    /// Submit random requests and run them concurrently
    Simulate {
        /// Number of runs
        #[arg(long, default_value = "4")]
        runs: usize,

        /// Genres selected per run
        #[arg(long, default_value = "2")]
        genres_per_run: usize,

        /// Target playlists selected per run
        #[arg(long, default_value = "3")]
        playlists_per_run: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Submit {
            run_id,
            model,
            playlists,
            genres,
        } => handle_submit(&config, run_id, model, playlists, genres)?,
        Commands::Prepare { run_id } => handle_prepare(&config, run_id).await?,
        Commands::Execute { run_id } => handle_execute(&config, run_id).await?,
        Commands::Run { run_id } => handle_run(&config, run_id).await?,
        Commands::Genres => handle_genres(&config)?,
        Commands::Resolve { genres } => handle_resolve(&config, genres)?,
        Commands::Simulate {
            runs,
            genres_per_run,
            playlists_per_run,
        } => handle_simulate(&config, runs, genres_per_run, playlists_per_run).await?,
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dataset) = &cli.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(runs_dir) = &cli.runs_dir {
        config.runs_dir = runs_dir.clone();
    }
    Ok(config)
}

fn load_dataset(config: &PipelineConfig) -> Result<Arc<Dataset>> {
    let start = Instant::now();
    let dataset = Dataset::load_validated(&config.dataset_path)
        .with_context(|| format!("Failed to load dataset {}", config.dataset_path.display()))?;
    let (playlists, genres, models) = dataset.counts();
    println!(
        "{} Loaded {} playlists, {} genres, {} models in {:?}",
        "✓".green(),
        playlists,
        genres,
        models,
        start.elapsed()
    );
    Ok(Arc::new(dataset))
}

/// Prints events as they are emitted
struct PrintSink;

impl SignalSink for PrintSink {
    fn emit(&self, event: RunEvent) {
        print_event(&event);
    }
}

fn print_event(event: &RunEvent) {
    println!("{} {}", "→".cyan(), event.to_string().bold());
}

/// Handle the 'submit' command
fn handle_submit(
    config: &PipelineConfig,
    run_id: RunId,
    model: String,
    playlists: Vec<String>,
    genres: Vec<String>,
) -> Result<()> {
    let request = RunRequest {
        selected_model: model,
        playlist_selections: playlists.into_iter().map(PlaylistId::from).collect(),
        genre_selections: genres.into_iter().collect(),
    };
    let path = config
        .registry()
        .write_request(&run_id, &request, config.write_mode())?;
    println!("{} Submitted run {} ({})", "✓".green(), run_id, path.display());
    Ok(())
}

/// Handle the 'prepare' command
async fn handle_prepare(config: &PipelineConfig, run_id: RunId) -> Result<()> {
    let resolver = PlaylistResolver::new(load_dataset(config)?);
    let preparer =
        RunPreparer::new(config.registry(), resolver).with_write_mode(config.write_mode());

    let input = {
        let run_id = run_id.clone();
        tokio::task::spawn_blocking(move || preparer.prepare(&run_id))
            .await
            .context("Preparer task panicked")??
    };
    println!("{}", format!("Prepared run {}", run_id).bold().blue());
    print_playlists("Target", &input.target_playlists);
    print_playlists("Reject", &input.reject_playlists);
    print_playlists("Inference", &input.inference_playlists);
    Ok(())
}

/// Handle the 'execute' command
async fn handle_execute(config: &PipelineConfig, run_id: RunId) -> Result<()> {
    let executor = RunExecutor::new(config.registry(), Arc::new(config.generator.build()))
        .with_write_mode(config.write_mode());

    let output = tokio::task::spawn_blocking(move || executor.execute(&run_id, &PrintSink))
        .await
        .context("Executor task panicked")??;
    print_output(&output);
    Ok(())
}

/// Handle the 'run' command
async fn handle_run(config: &PipelineConfig, run_id: RunId) -> Result<()> {
    let (orchestrator, mut events) = RunOrchestrator::from_config(config)?;

    let output = orchestrator.run(run_id.clone()).await?;
    match events.wait_for_done(&run_id).await {
        Some(seen) => seen.iter().for_each(print_event),
        None => bail!("Event channel closed before run {} finished", run_id),
    }
    print_output(&output);
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(config: &PipelineConfig) -> Result<()> {
    let dataset = load_dataset(config)?;
    let sentinel = dataset.remove_genre();

    println!("{}", "Genres:".bold().blue());
    for genre in dataset.genre_names() {
        let count = dataset.genre_slugs(genre).map_or(0, |slugs| slugs.len());
        let marker = if genre == sentinel {
            " (never inverted)".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {} {}: {} playlists{}", "•".green(), genre, count, marker);
    }
    Ok(())
}

/// Handle the 'resolve' command
fn handle_resolve(config: &PipelineConfig, genres: Vec<String>) -> Result<()> {
    let resolver = PlaylistResolver::new(load_dataset(config)?);

    let inference = resolver.genres_to_playlists_with_slugs(&genres)?;
    let inverted = resolver.invert_genre_set(&genres);
    let reject = resolver.genres_to_playlists(&inverted)?;

    println!(
        "{}",
        format!("Selection: [{}]", genres.join(", ")).bold().blue()
    );
    println!(
        "{}Inference slugs: {}",
        "• ".green(),
        join(inference.slugs.iter())
    );
    print_playlists("Inference", &inference.playlist_ids);
    println!("{}Inverted genres: {}", "• ".cyan(), join(inverted.iter()));
    print_playlists("Reject", &reject);
    Ok(())
}

/// Handle the 'simulate' command
async fn handle_simulate(
    config: &PipelineConfig,
    runs: usize,
    genres_per_run: usize,
    playlists_per_run: usize,
) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    let (orchestrator, mut events) = RunOrchestrator::from_config(config)?;
    let dataset = orchestrator.dataset().clone();
    let registry = orchestrator.preparer().registry().clone();

    let genres: Vec<&String> = dataset
        .genre_names()
        .filter(|g| g.as_str() != dataset.remove_genre())
        .collect();
    let models: Vec<&String> = dataset.models().keys().collect();

    // Submit and prepare one random request per run
    let batch = std::process::id();
    let mut run_ids = Vec::with_capacity(runs);
    for i in 0..runs {
        let run_id = RunId::new(format!("sim-{}-{}", batch, i))?;
        let request = {
            let mut rng = rand::rng();
            RunRequest {
                selected_model: models
                    .choose(&mut rng)
                    .map_or_else(|| "default".to_string(), |m| m.to_string()),
                playlist_selections: dataset
                    .playlists()
                    .values()
                    .cloned()
                    .choose_multiple(&mut rng, playlists_per_run)
                    .into_iter()
                    .collect(),
                genre_selections: genres
                    .choose_multiple(&mut rng, genres_per_run)
                    .map(|g| g.to_string())
                    .collect(),
            }
        };
        registry.write_request(&run_id, &request, config.write_mode())?;
        orchestrator.prepare(&run_id).await?;
        run_ids.push(run_id);
    }

    // Launch every run at once
    let start = Instant::now();
    let supervisors: Vec<_> = run_ids
        .iter()
        .map(|run_id| {
            let handle = orchestrator.launch(run_id.clone());
            tokio::spawn(async move {
                let result = handle.await;
                (result, start.elapsed())
            })
        })
        .collect();

    let mut latencies = Vec::with_capacity(runs);
    let mut generator_times = Vec::with_capacity(runs);
    let mut failures = 0;
    for supervisor in supervisors {
        let (result, elapsed) = supervisor.await.context("Simulation task panicked")?;
        match result.context("Run supervisor task panicked")? {
            Ok(output) => {
                latencies.push(elapsed);
                generator_times.push(output.ts_profile.ts_total_length);
            }
            Err(e) => {
                failures += 1;
                error!("{:#}", e);
            }
        }
    }
    while let Some(event) = events.try_next() {
        print_event(&event);
    }

    // Calculate and display statistics
    let total_time = start.elapsed();
    info!(
        "Simulation finished: {} runs, {} failed, wall time {:?}",
        runs, failures, total_time
    );
    println!("{}", "Simulation results:".bold().blue());
    println!("Runs: {} ({} failed)", runs, failures);
    println!("Wall time: {:?}", total_time);
    if !latencies.is_empty() {
        latencies.sort();
        let avg = latencies.iter().sum::<Duration>() / latencies.len() as u32;
        println!("Average completion: {:?}", avg);
        println!("P50 completion: {:?}", latencies[latencies.len() / 2]);
        println!("Max completion: {:?}", latencies[latencies.len() - 1]);
    }
    if !generator_times.is_empty() {
        let avg = generator_times.iter().sum::<f64>() / generator_times.len() as f64;
        println!("Average generator time: {:.2}s", avg);
    }
    println!(
        "Throughput: {:.2} runs/second",
        (runs - failures) as f64 / total_time.as_secs_f64()
    );

    if failures > 0 {
        bail!("{} of {} runs failed", failures, runs);
    }
    Ok(())
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_playlists(label: &str, ids: &BTreeSet<PlaylistId>) {
    println!(
        "{}{} playlists ({}): {}",
        "• ".green(),
        label,
        ids.len(),
        join(ids.iter())
    );
}

/// Helper function to format and print a run's output
fn print_output(output: &pipeline::RunOutput) {
    println!(
        "{}",
        format!("Run {} ({})", output.run_id, output.model_type)
            .bold()
            .blue()
    );
    println!("Results: {}", join(output.results.iter()));
    let profile = &output.ts_profile;
    println!(
        "Timing: {:.2}s total ({:.2}s training, {:.2}s inference)",
        profile.ts_total_length, profile.ts_training_length, profile.ts_inference_length
    );
}
