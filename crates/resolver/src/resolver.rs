//! `PlaylistResolver`: the genre functions bound to a shared dataset.

use crate::error::Result;
use crate::genres;
use crate::types::{PlaylistSets, Resolved};
use data_loader::{Dataset, Genre, PlaylistId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves genre selections against one dataset.
///
/// Cheap to clone; the dataset is shared read-only.
#[derive(Debug, Clone)]
pub struct PlaylistResolver {
    dataset: Arc<Dataset>,
}

impl PlaylistResolver {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn genres_to_playlists<I, S>(&self, genres: I) -> Result<BTreeSet<PlaylistId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        genres::genres_to_playlists(&self.dataset, genres)
    }

    pub fn genres_to_playlists_with_slugs<I, S>(&self, genres: I) -> Result<Resolved>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        genres::genres_to_playlists_with_slugs(&self.dataset, genres)
    }

    pub fn invert_genre_set<I, S>(&self, genres: I) -> BTreeSet<Genre>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        genres::invert_genre_set(&self.dataset, genres)
    }

    /// Derive all three playlist categories for a selection
    ///
    /// - target: the selected playlists, unresolved
    /// - reject: playlists of the inverted genre set
    /// - inference: playlists of the selected genres
    #[instrument(skip_all, fields(targets = targets.len(), genres = genres.len()))]
    pub fn resolve(
        &self,
        targets: &BTreeSet<PlaylistId>,
        genres: &BTreeSet<Genre>,
    ) -> Result<PlaylistSets> {
        let inference = self.genres_to_playlists(genres)?;
        let rejected_genres = self.invert_genre_set(genres);
        let reject = self.genres_to_playlists(&rejected_genres)?;

        debug!(
            "Resolved {} inference and {} reject playlists ({} rejected genres)",
            inference.len(),
            reject.len(),
            rejected_genres.len()
        );

        Ok(PlaylistSets {
            target: targets.clone(),
            reject,
            inference,
        })
    }
}
