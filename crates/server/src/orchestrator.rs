//! # Run Orchestrator
//!
//! This module coordinates concurrent runs of the recommendation pipeline:
//! 1. Prepare a run (`request.json` -> `input.json`) on the blocking pool
//! 2. Launch the executor for the run on its own blocking task
//! 3. Forward every run event to a single shared channel
//! 4. Track each run's `RunState`, marking it `Failed` when its worker
//!    returns an error or panics
//!
//! Runs never share a directory and the dataset is shared read-only, so the
//! event channel and the state table are the only shared mutable state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use data_loader::Dataset;
use generator::RecommendationGenerator;
use pipeline::{
    PipelineConfig, RunEvent, RunEventKind, RunExecutor, RunId, RunInput, RunOutput, RunPreparer,
    RunState, SignalSink,
};
use resolver::PlaylistResolver;

type StateTable = Arc<Mutex<HashMap<RunId, RunState>>>;

fn lock(states: &StateTable) -> MutexGuard<'_, HashMap<RunId, RunState>> {
    // A poisoned table still holds valid states
    states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sink shared by all workers: records the transition, then forwards the event
struct TrackingSink {
    states: StateTable,
    tx: UnboundedSender<RunEvent>,
}

impl SignalSink for TrackingSink {
    fn emit(&self, event: RunEvent) {
        {
            let mut states = lock(&self.states);
            let state = states.entry(event.run_id.clone()).or_default();
            *state = state.on_event(event.kind);
            debug!("Run {} is now {:?}", event.run_id, state);
        }
        self.tx.emit(event);
    }
}

/// Receiving end of the orchestrator's event channel
pub struct RunEvents {
    rx: UnboundedReceiver<RunEvent>,
}

impl RunEvents {
    /// Next event from any run, `None` once the orchestrator is dropped
    pub async fn next(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Next event already delivered, without waiting
    pub fn try_next(&mut self) -> Option<RunEvent> {
        self.rx.try_recv().ok()
    }

    /// Consume events until `run_id` reports `Done`
    ///
    /// Events of other runs seen while waiting are returned alongside, in
    /// arrival order. Returns `None` if the channel closes first.
    pub async fn wait_for_done(&mut self, run_id: &RunId) -> Option<Vec<RunEvent>> {
        let mut seen = Vec::new();
        while let Some(event) = self.rx.recv().await {
            let finished = event.kind == RunEventKind::Done && &event.run_id == run_id;
            seen.push(event);
            if finished {
                return Some(seen);
            }
        }
        None
    }
}

/// Main orchestrator that owns the shared resources of all runs
#[derive(Clone)]
pub struct RunOrchestrator {
    dataset: Arc<Dataset>,
    preparer: RunPreparer,
    executor: RunExecutor,
    sink: Arc<TrackingSink>,
}

impl RunOrchestrator {
    /// Create an orchestrator and the receiver for its events
    ///
    /// # Arguments
    /// * `preparer` - Preparer bound to the runs root and the dataset
    /// * `executor` - Executor bound to the same runs root and a generator
    pub fn new(preparer: RunPreparer, executor: RunExecutor) -> (Self, RunEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(TrackingSink {
            states: Arc::new(Mutex::new(HashMap::new())),
            tx,
        });
        let orchestrator = Self {
            dataset: preparer.resolver().dataset().clone(),
            preparer,
            executor,
            sink,
        };
        (orchestrator, RunEvents { rx })
    }

    /// Build every component from a configuration
    ///
    /// Loads and validates the dataset, then wires the simulated generator
    /// configured under `[generator]`.
    pub fn from_config(config: &PipelineConfig) -> Result<(Self, RunEvents)> {
        let dataset = Dataset::load_validated(&config.dataset_path).with_context(|| {
            format!("Failed to load dataset {}", config.dataset_path.display())
        })?;
        let (playlists, genres, models) = dataset.counts();
        info!(
            "Dataset ready: {} playlists, {} genres, {} models",
            playlists, genres, models
        );

        let generator: Arc<dyn RecommendationGenerator> = Arc::new(config.generator.build());
        Ok(Self::with_generator(config, Arc::new(dataset), generator))
    }

    /// Wire an orchestrator around an already loaded dataset and generator
    pub fn with_generator(
        config: &PipelineConfig,
        dataset: Arc<Dataset>,
        generator: Arc<dyn RecommendationGenerator>,
    ) -> (Self, RunEvents) {
        let registry = config.registry();
        let preparer = RunPreparer::new(registry.clone(), PlaylistResolver::new(dataset))
            .with_write_mode(config.write_mode());
        let executor = RunExecutor::new(registry, generator).with_write_mode(config.write_mode());
        Self::new(preparer, executor)
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn preparer(&self) -> &RunPreparer {
        &self.preparer
    }

    /// Current state of a run; runs never launched are `NotStarted`
    pub fn state(&self, run_id: &RunId) -> RunState {
        lock(&self.sink.states)
            .get(run_id)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of every tracked run, sorted by run id
    pub fn states(&self) -> Vec<(RunId, RunState)> {
        let mut states: Vec<_> = lock(&self.sink.states)
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }

    /// Prepare a run on the blocking pool
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn prepare(&self, run_id: &RunId) -> Result<RunInput> {
        let preparer = self.preparer.clone();
        let id = run_id.clone();
        tokio::task::spawn_blocking(move || preparer.prepare(&id))
            .await
            .context("Preparer task panicked")?
            .with_context(|| format!("Failed to prepare run {}", run_id))
    }

    /// Launch the executor for a prepared run
    ///
    /// Returns immediately. The handle resolves to the run's output, or to
    /// the error that made the run `Failed`.
    pub fn launch(&self, run_id: RunId) -> JoinHandle<Result<RunOutput>> {
        lock(&self.sink.states).insert(run_id.clone(), RunState::NotStarted);
        info!("Launching run {}", run_id);

        let executor = self.executor.clone();
        let sink = self.sink.clone();
        let states = self.sink.states.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();
            let worker = {
                let run_id = run_id.clone();
                tokio::task::spawn_blocking(move || executor.execute(&run_id, sink.as_ref()))
            };

            let result = match worker.await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(anyhow::Error::new(e).context(format!("Run {} failed", run_id))),
                Err(join_error) => Err(anyhow!("Worker for run {} died: {}", run_id, join_error)),
            };

            match &result {
                Ok(_) => info!("Run {} finished in {:.2?}", run_id, start_time.elapsed()),
                Err(e) => {
                    error!("{:#}", e);
                    let mut states = lock(&states);
                    let state = states.entry(run_id.clone()).or_default();
                    *state = state.fail();
                }
            }
            result
        })
    }

    /// Prepare and execute a run, waiting for it to finish
    pub async fn run(&self, run_id: RunId) -> Result<RunOutput> {
        self.prepare(&run_id).await?;
        self.launch(run_id)
            .await
            .context("Run supervisor task panicked")?
    }
}
