//! Parser for the dataset JSON document.
//!
//! Format:
//! ```json
//! {
//!   "playlists": { "<slug>": "<id>" | <id> },
//!   "genres":    { "<genre>": ["<slug>", ...] },
//!   "models":    { "<name>": { ... } },
//!   "config":    { "genre_remove_item": "<genre>" }
//! }
//! ```
//!
//! All four sections are required. Unknown top-level keys are ignored.

use crate::error::{DatasetLoadError, Result};
use crate::types::Dataset;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read the dataset file into a string
///
/// A missing file gets its own error variant so callers can tell
/// "wrong path" apart from "unreadable file".
fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatasetLoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetLoadError::IoError(e),
    })
}

/// Parse a dataset document
///
/// `file` only labels errors; it is not opened.
pub fn parse_dataset(content: &str, file: &str) -> Result<Dataset> {
    serde_json::from_str(content).map_err(|e| DatasetLoadError::Malformed {
        file: file.to_string(),
        line: e.line(),
        column: e.column(),
        reason: e.to_string(),
    })
}

/// Read and parse the dataset file at `path`
pub fn parse_dataset_file(path: &Path) -> Result<Dataset> {
    let content = read_document(path)?;
    parse_dataset(&content, &path.display().to_string())
}
