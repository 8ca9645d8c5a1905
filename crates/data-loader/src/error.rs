//! Error types for the data-loader crate.
//!
//! Every failure while reading the dataset document maps onto one
//! `DatasetLoadError` variant. Nothing here is retried; callers decide
//! whether a broken dataset is fatal (it always is for the pipeline).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or checking the dataset
#[derive(Error, Debug)]
pub enum DatasetLoadError {
    /// Dataset file does not exist
    #[error("Dataset file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// I/O error occurred while reading the file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Document is not valid JSON or is missing a required section
    ///
    /// Line and column come straight from serde_json so an operator can
    /// jump to the offending spot in the file.
    #[error("Malformed dataset {file} at line {line}, column {column}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        column: usize,
        reason: String,
    },

    /// A genre references a playlist slug that has no playlist entry
    #[error("Genre {genre} references unknown playlist slug {slug}")]
    MissingReference { genre: String, slug: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DatasetLoadError>;
