//! Run registry: the file-system layout of runs.
//!
//! Every run lives in `<root>/<run_id>/`. The registry is the only place
//! that turns a `RunId` into a path, and it maps low-level file errors
//! onto the `RunError` variant of the document involved.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FileError, Result, RunError};
use crate::files::{
    self, INPUT_FILE, OUTPUT_FILE, REQUEST_FILE, RunInput, RunOutput, RunRequest, WriteMode,
};
use crate::run_id::RunId;

/// Locates and reads/writes run documents under a root directory
#[derive(Debug, Clone)]
pub struct RunRegistry {
    root: PathBuf,
}

impl RunRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.root.join(run_id.as_str())
    }

    pub fn request_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(REQUEST_FILE)
    }

    pub fn input_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(INPUT_FILE)
    }

    pub fn output_path(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(OUTPUT_FILE)
    }

    /// Create the run directory (and any missing parents)
    pub fn ensure_run_dir(&self, run_id: &RunId) -> Result<PathBuf> {
        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir).map_err(|source| RunError::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;
        debug!("Run directory ready: {}", dir.display());
        Ok(dir)
    }

    /// Write `request.json`, creating the run directory if needed
    pub fn write_request(
        &self,
        run_id: &RunId,
        request: &RunRequest,
        mode: WriteMode,
    ) -> Result<PathBuf> {
        self.ensure_run_dir(run_id)?;
        let path = self.request_path(run_id);
        write_document(&path, request, mode)?;
        Ok(path)
    }

    pub fn read_request(&self, run_id: &RunId) -> Result<RunRequest> {
        let path = self.request_path(run_id);
        files::read_json(&path).map_err(|source| RunError::RequestRead { path, source })
    }

    pub fn write_input(&self, run_id: &RunId, input: &RunInput, mode: WriteMode) -> Result<PathBuf> {
        let path = self.input_path(run_id);
        write_document(&path, input, mode)?;
        Ok(path)
    }

    pub fn read_input(&self, run_id: &RunId) -> Result<RunInput> {
        let path = self.input_path(run_id);
        files::read_json(&path).map_err(|source| RunError::InputRead { path, source })
    }

    pub fn write_output(
        &self,
        run_id: &RunId,
        output: &RunOutput,
        mode: WriteMode,
    ) -> Result<PathBuf> {
        let path = self.output_path(run_id);
        write_document(&path, output, mode)?;
        Ok(path)
    }

    pub fn read_output(&self, run_id: &RunId) -> Result<RunOutput> {
        let path = self.output_path(run_id);
        files::read_json(&path).map_err(|source| RunError::OutputRead { path, source })
    }

    /// Run ids with a directory under the root, sorted
    ///
    /// Entries whose names are not valid run ids are skipped. A missing
    /// root simply means no runs yet.
    pub fn list_runs(&self) -> Result<Vec<RunId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RunError::DirectoryRead {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut runs = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match RunId::new(name) {
                Ok(run_id) => runs.push(run_id),
                Err(e) => warn!("Skipping directory in runs root: {}", e),
            }
        }
        runs.sort();
        Ok(runs)
    }
}

fn write_document<T: serde::Serialize>(path: &Path, value: &T, mode: WriteMode) -> Result<()> {
    files::write_json(path, value, mode).map_err(|source| match source {
        FileError::Io(ref e) if e.kind() == ErrorKind::AlreadyExists => RunError::AlreadyExists {
            path: path.to_path_buf(),
        },
        source => RunError::FileWrite {
            path: path.to_path_buf(),
            source,
        },
    })
}
