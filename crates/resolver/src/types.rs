//! Result types produced by the resolver.

use data_loader::{PlaylistId, PlaylistSlug};
use std::collections::BTreeSet;

/// Output of a genre -> playlist resolution, with the intermediate slugs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub playlist_ids: BTreeSet<PlaylistId>,
    pub slugs: BTreeSet<PlaylistSlug>,
}

/// The three playlist categories derived for one run.
///
/// Categories are computed independently and may overlap: a playlist
/// selected as a target can also be reachable through a selected genre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSets {
    /// Playlists the model should produce output similar to
    pub target: BTreeSet<PlaylistId>,
    /// Playlists of every genre the user did not select
    pub reject: BTreeSet<PlaylistId>,
    /// Playlists of the selected genres
    pub inference: BTreeSet<PlaylistId>,
}
