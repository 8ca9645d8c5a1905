//! Run pipeline: preparing and executing recommendation runs.
//!
//! This crate provides:
//! - `RunId` and `RunRegistry` for the on-disk layout of runs
//! - `RunPreparer`, which resolves a request into an executor input
//! - `RunExecutor`, which feeds an input to a generator and writes the output
//! - `RunEvent` / `SignalSink` for lifecycle signalling, and `RunState`
//! - `PipelineConfig` for TOML-based configuration
//!
//! ## Architecture
//! A run moves through three documents in its own directory:
//! 1. `request.json` is written by whoever submits the run
//! 2. `input.json` is written by the preparer
//! 3. `output.json` is written by the executor, bracketed by `Start`/`Done`
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{RunExecutor, RunId, RunPreparer, RunRegistry};
//! use resolver::PlaylistResolver;
//!
//! let registry = RunRegistry::new("data/runs");
//! let preparer = RunPreparer::new(registry.clone(), PlaylistResolver::new(dataset));
//! let executor = RunExecutor::new(registry, generator);
//!
//! let run_id = RunId::new("run-42")?;
//! preparer.prepare(&run_id)?;
//! let (tx, rx) = std::sync::mpsc::channel();
//! let output = executor.execute(&run_id, &tx)?;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod files;
pub mod lifecycle;
pub mod preparer;
pub mod registry;
pub mod run_id;
pub mod signals;

// Re-export main types
pub use config::{ConfigError, GeneratorSettings, PipelineConfig};
pub use error::{FileError, Result, RunError};
pub use executor::RunExecutor;
pub use files::{RunInput, RunOutput, RunRequest, TsProfile, WriteMode};
pub use lifecycle::RunState;
pub use preparer::RunPreparer;
pub use registry::RunRegistry;
pub use run_id::{InvalidRunId, RunId};
pub use signals::{ParseEventError, RunEvent, RunEventKind, SignalSink};
