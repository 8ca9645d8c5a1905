//! Simulated generator
//!
//! Stands in for a trained model. It does no real work:
//!
//! ## Algorithm
//! 1. Training: `training_epochs` steps, sleeping `training_step_delay` each
//! 2. Inference: `inference_steps` steps, sleeping `inference_step_delay`
//!    each and pushing the step index as a result
//! 3. Report the measured wall-clock time of both phases
//!
//! Defaults are 10 training epochs at 500ms and 10 inference steps at
//! 250ms, i.e. roughly 7.5 seconds per run.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::{GenerationRequest, GeneratorError, Recommendations, RecommendationGenerator, TimingProfile};

pub const DEFAULT_TRAINING_EPOCHS: usize = 10;
pub const DEFAULT_INFERENCE_STEPS: usize = 10;
pub const DEFAULT_TRAINING_STEP_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_INFERENCE_STEP_DELAY: Duration = Duration::from_millis(250);

/// Upper bound on the result buffer reserved up front
const MAX_RESERVED_RESULTS: usize = 1024;

/// Placeholder generator that simulates training and inference
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    training_epochs: usize,
    inference_steps: usize,
    training_step_delay: Duration,
    inference_step_delay: Duration,
}

impl SimulatedGenerator {
    pub fn new() -> Self {
        Self {
            training_epochs: DEFAULT_TRAINING_EPOCHS,
            inference_steps: DEFAULT_INFERENCE_STEPS,
            training_step_delay: DEFAULT_TRAINING_STEP_DELAY,
            inference_step_delay: DEFAULT_INFERENCE_STEP_DELAY,
        }
    }

    /// Configure the number of training epochs (default: 10)
    pub fn with_training_epochs(mut self, epochs: usize) -> Self {
        self.training_epochs = epochs;
        self
    }

    /// Configure the number of inference steps (default: 10)
    ///
    /// This is also the number of results each run produces.
    pub fn with_inference_steps(mut self, steps: usize) -> Self {
        self.inference_steps = steps;
        self
    }

    /// Configure the per-epoch training delay (default: 500ms)
    pub fn with_training_step_delay(mut self, delay: Duration) -> Self {
        self.training_step_delay = delay;
        self
    }

    /// Configure the per-step inference delay (default: 250ms)
    pub fn with_inference_step_delay(mut self, delay: Duration) -> Self {
        self.inference_step_delay = delay;
        self
    }

    pub fn inference_steps(&self) -> usize {
        self.inference_steps
    }

    fn result_buffer(&self) -> Vec<String> {
        Vec::with_capacity(self.inference_steps.min(MAX_RESERVED_RESULTS))
    }

    fn train(&self, run_id: &str) -> Duration {
        let start = Instant::now();
        for epoch in 0..self.training_epochs {
            debug!("run {}: training - sample epoch {}", run_id, epoch);
            thread::sleep(self.training_step_delay);
        }
        start.elapsed()
    }

    fn infer(&self, run_id: &str, results: &mut Vec<String>) -> Duration {
        let start = Instant::now();
        for step in 0..self.inference_steps {
            debug!("run {}: inference - sample epoch {}", run_id, step);
            results.push(step.to_string());
            thread::sleep(self.inference_step_delay);
        }
        start.elapsed()
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationGenerator for SimulatedGenerator {
    fn name(&self) -> &str {
        "SimulatedGenerator"
    }

    #[instrument(skip_all, fields(run_id = request.run_id, model = request.model_type))]
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<Recommendations, GeneratorError> {
        info!(
            "Generating recommendations for run {} (targets={}, rejects={}, inference={})",
            request.run_id,
            request.target_playlists.len(),
            request.reject_playlists.len(),
            request.inference_playlists.len()
        );

        let mut results = self.result_buffer();
        let training = self.train(request.run_id);
        let inference = self.infer(request.run_id, &mut results);

        let timings = TimingProfile { training, inference };
        info!(
            "Run {} generated {} results in {:.2?} (training {:.2?}, inference {:.2?})",
            request.run_id,
            results.len(),
            timings.total(),
            training,
            inference
        );

        Ok(Recommendations { results, timings })
    }
}
