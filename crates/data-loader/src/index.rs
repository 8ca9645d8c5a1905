//! Dataset loading and integrity checks.
//!
//! This module is the entry point for getting a `Dataset` off disk:
//! - `Dataset::load` reads and parses the document
//! - `Dataset::validate` checks genre -> playlist references
//! - `Dataset::load_validated` does both

use crate::error::{DatasetLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

impl Dataset {
    /// Load the dataset document from `path`
    ///
    /// Fails with `FileNotFound` if the file is missing and `Malformed` if
    /// it is not a valid dataset document. Slug references are *not*
    /// checked here; see `load_validated`.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading dataset from {}", path.display());

        let dataset = parser::parse_dataset_file(path)?;

        let (playlists, genres, models) = dataset.counts();
        info!(
            "Loaded {} playlists, {} genres, {} models (remove genre: {:?})",
            playlists,
            genres,
            models,
            dataset.remove_genre()
        );
        Ok(dataset)
    }

    /// Load the dataset and run `validate` on it
    pub fn load_validated(path: &Path) -> Result<Self> {
        let dataset = Self::load(path)?;
        dataset.validate()?;
        debug!("Dataset references validated");
        Ok(dataset)
    }

    /// Parse a dataset from an in-memory JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        parser::parse_dataset(content, "<memory>")
    }

    /// Validate data integrity
    ///
    /// Every slug listed under a genre must have an entry in `playlists`.
    /// Genres are checked in parallel; the reported reference is the
    /// first dangling one in genre order.
    pub fn validate(&self) -> Result<()> {
        let dangling: Option<(Genre, PlaylistSlug)> = self
            .genres
            .par_iter()
            .filter_map(|(genre, slugs)| {
                slugs
                    .iter()
                    .find(|slug| !self.playlists.contains_key(slug.as_str()))
                    .map(|slug| (genre.clone(), slug.clone()))
            })
            .min();

        match dangling {
            Some((genre, slug)) => Err(DatasetLoadError::MissingReference { genre, slug }),
            None => Ok(()),
        }
    }
}
