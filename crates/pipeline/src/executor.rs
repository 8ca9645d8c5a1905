//! Run Executor: `input.json` -> generator -> `output.json`.
//!
//! ## Algorithm
//! 1. Emit `Start`
//! 2. Read `input.json`
//! 3. Hand the playlist sets to the generator
//! 4. Write `output.json` with results and phase timings
//! 5. Emit `Done`
//!
//! There are no retries. Any error in steps 2-4 is returned as-is and
//! `Done` is not emitted, so a consumer watching only the signal channel
//! sees the run stuck in `Running`.

use std::sync::Arc;

use generator::{GenerationRequest, RecommendationGenerator};
use tracing::{info, instrument};

use crate::error::Result;
use crate::files::{RunOutput, TsProfile, WriteMode};
use crate::registry::RunRegistry;
use crate::run_id::RunId;
use crate::signals::{RunEvent, SignalSink};

/// Executes prepared runs with a shared generator
#[derive(Clone)]
pub struct RunExecutor {
    registry: RunRegistry,
    generator: Arc<dyn RecommendationGenerator>,
    write_mode: WriteMode,
}

impl RunExecutor {
    /// Create an executor that overwrites existing outputs
    pub fn new(registry: RunRegistry, generator: Arc<dyn RecommendationGenerator>) -> Self {
        Self {
            registry,
            generator,
            write_mode: WriteMode::Overwrite,
        }
    }

    /// Configure what happens when `output.json` already exists
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    /// Execute one run, blocking until the generator finishes
    #[instrument(skip_all, fields(run_id = %run_id, generator = self.generator.name()))]
    pub fn execute(&self, run_id: &RunId, signals: &dyn SignalSink) -> Result<RunOutput> {
        signals.emit(RunEvent::start(run_id.clone()));

        let input = self.registry.read_input(run_id)?;
        info!("Generating recommendations for run {}", run_id);

        let recommendations = self.generator.generate(&GenerationRequest {
            run_id: run_id.as_str(),
            model_type: &input.model_type,
            target_playlists: &input.target_playlists,
            reject_playlists: &input.reject_playlists,
            inference_playlists: &input.inference_playlists,
        })?;

        let output = RunOutput {
            run_id: run_id.clone(),
            model_type: input.model_type,
            results: recommendations.results,
            ts_profile: TsProfile::from(recommendations.timings),
        };
        let path = self.registry.write_output(run_id, &output, self.write_mode)?;
        info!(
            "Run {} finished in {:.2}s, output at {}",
            run_id,
            output.ts_profile.ts_total_length,
            path.display()
        );

        signals.emit(RunEvent::done(run_id.clone()));
        Ok(output)
    }
}
