//! Recommendation generation for playlist runs.
//!
//! This crate defines the seam between the run pipeline and whatever
//! produces recommendations:
//! - `RecommendationGenerator`, the trait the executor calls
//! - `GenerationRequest` / `Recommendations`, its input and output
//! - `SimulatedGenerator`, a placeholder that walks through fixed
//!   training and inference epochs with per-step delays
//!
//! A real model only has to implement the trait; the preparer and
//! executor stay untouched.

use std::collections::BTreeSet;
use std::time::Duration;

use data_loader::PlaylistId;
use thiserror::Error;

pub mod simulated;

pub use simulated::SimulatedGenerator;

/// Errors that can occur while generating recommendations
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Model {model} failed: {reason}")]
    Model { model: String, reason: String },
}

/// Everything a generator gets to see for one run
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub run_id: &'a str,
    pub model_type: &'a str,
    pub target_playlists: &'a BTreeSet<PlaylistId>,
    pub reject_playlists: &'a BTreeSet<PlaylistId>,
    pub inference_playlists: &'a BTreeSet<PlaylistId>,
}

/// Wall-clock time spent in each phase of a generation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingProfile {
    pub training: Duration,
    pub inference: Duration,
}

impl TimingProfile {
    /// Training plus inference
    pub fn total(&self) -> Duration {
        self.training + self.inference
    }
}

/// Output of one generation
#[derive(Debug, Clone, Default)]
pub struct Recommendations {
    /// Ordered results, most relevant first
    pub results: Vec<String>,
    pub timings: TimingProfile,
}

/// Produces recommendations for a prepared run.
///
/// ## Design Note
/// - `Send + Sync` so one generator can serve runs on many worker threads
/// - Implementations block; async callers run them on a blocking pool
pub trait RecommendationGenerator: Send + Sync {
    /// Returns the name of this generator (for logging/debugging)
    fn name(&self) -> &str;

    /// Generate recommendations for one run
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<Recommendations, GeneratorError>;
}
