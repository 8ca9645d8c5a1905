//! Run Preparer: `request.json` -> `input.json`.
//!
//! ## Algorithm
//! 1. Create the run directory
//! 2. Read the request
//! 3. Resolve the three playlist categories:
//!    - target = selected playlists, as given
//!    - reject = playlists of every genre *not* selected (minus the sentinel)
//!    - inference = playlists of the selected genres
//! 4. Write `input.json`
//!
//! Steps 2 and 3 finish before anything is written, so a bad request
//! never leaves a partial `input.json` behind.

use resolver::PlaylistResolver;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::files::{RunInput, WriteMode};
use crate::registry::RunRegistry;
use crate::run_id::RunId;

/// Turns run requests into executor inputs
#[derive(Debug, Clone)]
pub struct RunPreparer {
    registry: RunRegistry,
    resolver: PlaylistResolver,
    write_mode: WriteMode,
}

impl RunPreparer {
    /// Create a preparer that overwrites existing inputs
    pub fn new(registry: RunRegistry, resolver: PlaylistResolver) -> Self {
        Self {
            registry,
            resolver,
            write_mode: WriteMode::Overwrite,
        }
    }

    /// Configure what happens when `input.json` already exists
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &PlaylistResolver {
        &self.resolver
    }

    /// Prepare one run, returning the input that was written
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub fn prepare(&self, run_id: &RunId) -> Result<RunInput> {
        self.registry.ensure_run_dir(run_id)?;
        let request = self.registry.read_request(run_id)?;

        if !self.resolver.dataset().has_model(&request.selected_model) {
            warn!(
                "Run {} selects model {:?}, which is not in the dataset",
                run_id, request.selected_model
            );
        }

        let sets = self
            .resolver
            .resolve(&request.playlist_selections, &request.genre_selections)?;

        let input = RunInput {
            run_id: run_id.clone(),
            model_type: request.selected_model,
            target_playlists: sets.target,
            reject_playlists: sets.reject,
            inference_playlists: sets.inference,
        };
        let path = self.registry.write_input(run_id, &input, self.write_mode)?;

        info!(
            "Prepared run {} -> {} (targets={}, rejects={}, inference={})",
            run_id,
            path.display(),
            input.target_playlists.len(),
            input.reject_playlists.len(),
            input.inference_playlists.len()
        );
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunError;
    use crate::files::RunRequest;
    use data_loader::{Dataset, PlaylistId};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn create_test_preparer(root: &std::path::Path) -> RunPreparer {
        let mut dataset = Dataset::new("misc");
        dataset.insert_playlist("p1", "1");
        dataset.insert_playlist("p2", "2");
        dataset.insert_genre("rock", ["p1"]);
        dataset.insert_genre("pop", ["p2"]);
        dataset.insert_genre("misc", ["p1", "p2"]);
        dataset.insert_model("baseline", serde_json::json!({}));

        RunPreparer::new(
            RunRegistry::new(root),
            PlaylistResolver::new(Arc::new(dataset)),
        )
    }

    fn request(genres: &[&str]) -> RunRequest {
        RunRequest {
            selected_model: "baseline".to_string(),
            playlist_selections: BTreeSet::from([PlaylistId::from("42")]),
            genre_selections: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_prepare_rock_selection() {
        let root = tempfile::tempdir().unwrap();
        let preparer = create_test_preparer(root.path());
        let run_id = RunId::new("r1").unwrap();
        preparer
            .registry()
            .write_request(&run_id, &request(&["rock"]), WriteMode::Overwrite)
            .unwrap();

        let input = preparer.prepare(&run_id).unwrap();

        assert_eq!(input.model_type, "baseline");
        assert_eq!(input.target_playlists, BTreeSet::from([PlaylistId::from("42")]));
        assert_eq!(input.inference_playlists, BTreeSet::from([PlaylistId::from("1")]));
        assert_eq!(input.reject_playlists, BTreeSet::from([PlaylistId::from("2")]));
        assert_eq!(preparer.registry().read_input(&run_id).unwrap(), input);
    }

    #[test]
    fn test_missing_request_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let preparer = create_test_preparer(root.path());
        let run_id = RunId::new("r1").unwrap();

        let err = preparer.prepare(&run_id).unwrap_err();

        assert!(matches!(err, RunError::RequestRead { .. }));
        assert!(!preparer.registry().input_path(&run_id).exists());
    }

    #[test]
    fn test_unknown_genre_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let preparer = create_test_preparer(root.path());
        let run_id = RunId::new("r1").unwrap();
        preparer
            .registry()
            .write_request(&run_id, &request(&["polka"]), WriteMode::Overwrite)
            .unwrap();

        let err = preparer.prepare(&run_id).unwrap_err();

        assert!(matches!(err, RunError::Resolve(_)));
        assert!(!preparer.registry().input_path(&run_id).exists());
    }

    #[test]
    fn test_create_new_mode_refuses_second_prepare() {
        let root = tempfile::tempdir().unwrap();
        let preparer = create_test_preparer(root.path()).with_write_mode(WriteMode::CreateNew);
        let run_id = RunId::new("r1").unwrap();
        preparer
            .registry()
            .write_request(&run_id, &request(&["pop"]), WriteMode::Overwrite)
            .unwrap();

        preparer.prepare(&run_id).unwrap();
        assert!(matches!(
            preparer.prepare(&run_id),
            Err(RunError::AlreadyExists { .. })
        ));
    }
}
