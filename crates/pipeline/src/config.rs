//! Pipeline configuration.
//!
//! Read from an optional TOML file; every field has a default so an
//! empty file (or no file) is a valid configuration:
//!
//! ```toml
//! dataset_path = "dataset.json"
//! runs_dir = "data/runs"
//! overwrite = true
//!
//! [generator]
//! training_epochs = 10
//! inference_steps = 10
//! training_step_delay_ms = 500
//! inference_step_delay_ms = 250
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use generator::SimulatedGenerator;
use generator::simulated::{
    DEFAULT_INFERENCE_STEP_DELAY, DEFAULT_INFERENCE_STEPS, DEFAULT_TRAINING_EPOCHS,
    DEFAULT_TRAINING_STEP_DELAY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::files::WriteMode;
use crate::registry::RunRegistry;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dataset JSON document
    pub dataset_path: PathBuf,
    /// Root directory holding one sub-directory per run
    pub runs_dir: PathBuf,
    /// Whether `input.json` / `output.json` may replace existing files
    pub overwrite: bool,
    pub generator: GeneratorSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset.json"),
            runs_dir: PathBuf::from("data/runs"),
            overwrite: true,
            generator: GeneratorSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::CreateNew
        }
    }

    pub fn registry(&self) -> RunRegistry {
        RunRegistry::new(&self.runs_dir)
    }
}

/// Settings for the simulated generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub training_epochs: usize,
    pub inference_steps: usize,
    pub training_step_delay_ms: u64,
    pub inference_step_delay_ms: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            training_epochs: DEFAULT_TRAINING_EPOCHS,
            inference_steps: DEFAULT_INFERENCE_STEPS,
            training_step_delay_ms: DEFAULT_TRAINING_STEP_DELAY.as_millis() as u64,
            inference_step_delay_ms: DEFAULT_INFERENCE_STEP_DELAY.as_millis() as u64,
        }
    }
}

impl GeneratorSettings {
    pub fn build(&self) -> SimulatedGenerator {
        SimulatedGenerator::new()
            .with_training_epochs(self.training_epochs)
            .with_inference_steps(self.inference_steps)
            .with_training_step_delay(Duration::from_millis(self.training_step_delay_ms))
            .with_inference_step_delay(Duration::from_millis(self.inference_step_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.generator.training_step_delay_ms, 500);
        assert_eq!(config.generator.inference_step_delay_ms, 250);
        assert_eq!(config.write_mode(), WriteMode::Overwrite);
    }

    #[test]
    fn test_partial_override() {
        let config: PipelineConfig = toml::from_str(
            r#"
            runs_dir = "/tmp/runs"
            overwrite = false

            [generator]
            inference_steps = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.runs_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(config.dataset_path, PathBuf::from("dataset.json"));
        assert_eq!(config.write_mode(), WriteMode::CreateNew);
        assert_eq!(config.generator.inference_steps, 3);
        assert_eq!(config.generator.training_epochs, 10);
        assert_eq!(config.generator.build().inference_steps(), 3);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            PipelineConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "overwrite = \"sometimes\"").unwrap();
        assert!(matches!(PipelineConfig::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_or_default() {
        assert_eq!(
            PipelineConfig::load_or_default(None).unwrap(),
            PipelineConfig::default()
        );
    }
}
