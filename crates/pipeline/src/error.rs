//! Error types for the run pipeline.
//!
//! Nothing in this crate retries or swallows an error: each variant is
//! fatal to the operation it came from and is handed back to the caller.

use std::path::PathBuf;

use generator::GeneratorError;
use resolver::ResolveError;
use thiserror::Error;

/// Low-level failure reading or writing one JSON file
#[derive(Error, Debug)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while preparing or executing a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to create run directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list runs in {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read request {}: {source}", path.display())]
    RequestRead {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("Failed to read run input {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("Failed to read run output {}: {source}", path.display())]
    OutputRead {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    /// Write refused because overwriting was not requested
    #[error("{} already exists and overwrite is disabled", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Failed to resolve playlists: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Recommendation generation failed: {0}")]
    Generation(#[from] GeneratorError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RunError>;
