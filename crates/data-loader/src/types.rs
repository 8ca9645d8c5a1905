//! Core domain types for the playlist dataset.
//!
//! The dataset document has four sections:
//! - `playlists`: playlist slug -> playlist id
//! - `genres`: genre name -> list of playlist slugs
//! - `models`: model name -> opaque model configuration
//! - `config`: dataset-wide settings (the sentinel genre)
//!
//! All maps are `BTreeMap`s so iteration order is stable, which keeps
//! every file derived from the dataset reproducible byte for byte.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Human-readable playlist key used by genre listings (e.g. "indie-mix")
pub type PlaylistSlug = String;

/// Genre name as it appears in the dataset (e.g. "rock")
pub type Genre = String;

/// Name of a model entry in the dataset's `models` section
pub type ModelName = String;

// =============================================================================
// Playlist identifiers
// =============================================================================

/// Identifier of a playlist.
///
/// Requests and datasets carry ids either as JSON strings or as JSON
/// integers. Both forms are kept as-is so files we write echo back the
/// same JSON type we were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaylistId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistId::Numeric(id) => write!(f, "{}", id),
            PlaylistId::Text(id) => f.write_str(id),
        }
    }
}

impl From<&str> for PlaylistId {
    fn from(id: &str) -> Self {
        PlaylistId::Text(id.to_string())
    }
}

impl From<String> for PlaylistId {
    fn from(id: String) -> Self {
        PlaylistId::Text(id)
    }
}

impl From<i64> for PlaylistId {
    fn from(id: i64) -> Self {
        PlaylistId::Numeric(id)
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Dataset-wide settings from the `config` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Catch-all genre that never takes part in genre inversion
    pub genre_remove_item: Genre,
}

/// In-memory view of the dataset document.
///
/// Loaded once and then shared read-only (usually behind an `Arc`).
/// The `insert_*` methods exist for building datasets in code; nothing in
/// the pipeline mutates a dataset after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub(crate) playlists: BTreeMap<PlaylistSlug, PlaylistId>,
    pub(crate) genres: BTreeMap<Genre, Vec<PlaylistSlug>>,
    pub(crate) models: BTreeMap<ModelName, serde_json::Value>,
    pub(crate) config: DatasetConfig,
}

impl Dataset {
    /// Creates an empty dataset with the given sentinel genre
    pub fn new(genre_remove_item: impl Into<Genre>) -> Self {
        Self {
            playlists: BTreeMap::new(),
            genres: BTreeMap::new(),
            models: BTreeMap::new(),
            config: DatasetConfig {
                genre_remove_item: genre_remove_item.into(),
            },
        }
    }

    // Read-only views

    pub fn playlists(&self) -> &BTreeMap<PlaylistSlug, PlaylistId> {
        &self.playlists
    }

    pub fn genres(&self) -> &BTreeMap<Genre, Vec<PlaylistSlug>> {
        &self.genres
    }

    pub fn models(&self) -> &BTreeMap<ModelName, serde_json::Value> {
        &self.models
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The sentinel genre excluded from inversion
    pub fn remove_genre(&self) -> &str {
        &self.config.genre_remove_item
    }

    /// Look up the playlist id for a slug
    pub fn playlist_id(&self, slug: &str) -> Option<&PlaylistId> {
        self.playlists.get(slug)
    }

    /// Playlist slugs listed under a genre, `None` if the genre is unknown
    pub fn genre_slugs(&self, genre: &str) -> Option<&[PlaylistSlug]> {
        self.genres.get(genre).map(|v| v.as_slice())
    }

    /// Every genre name, in sorted order
    pub fn genre_names(&self) -> impl Iterator<Item = &Genre> {
        self.genres.keys()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.contains_key(genre)
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    // Mutators, used when building a dataset in code

    pub fn insert_playlist(&mut self, slug: impl Into<PlaylistSlug>, id: impl Into<PlaylistId>) {
        self.playlists.insert(slug.into(), id.into());
    }

    /// Insert a genre, replacing any existing slug list for it
    pub fn insert_genre<S: Into<PlaylistSlug>>(
        &mut self,
        genre: impl Into<Genre>,
        slugs: impl IntoIterator<Item = S>,
    ) {
        self.genres
            .insert(genre.into(), slugs.into_iter().map(Into::into).collect());
    }

    pub fn insert_model(&mut self, name: impl Into<ModelName>, config: serde_json::Value) {
        self.models.insert(name.into(), config);
    }

    /// Get counts for debugging/validation: (playlists, genres, models)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.playlists.len(), self.genres.len(), self.models.len())
    }
}
