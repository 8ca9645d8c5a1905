//! Genre -> playlist resolution over a loaded dataset.
//!
//! ## Algorithm
//! `genres_to_playlists`:
//! 1. For every input genre, union in the slugs it lists
//! 2. Map each distinct slug to its playlist id
//! 3. Collect the ids into a set (two slugs may share an id)
//!
//! `invert_genre_set`:
//! every genre of the dataset that is neither selected nor the
//! configured sentinel genre.
//!
//! All functions are pure with respect to the dataset.

use crate::error::{ResolveError, Result};
use crate::types::Resolved;
use data_loader::{Dataset, Genre, PlaylistId, PlaylistSlug};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Resolve genres to playlist ids, keeping the intermediate slugs
pub fn genres_to_playlists_with_slugs<I, S>(dataset: &Dataset, genres: I) -> Result<Resolved>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // slug -> first genre that listed it, for error context
    let mut slug_owner: BTreeMap<&PlaylistSlug, String> = BTreeMap::new();
    for genre in genres {
        let genre = genre.as_ref();
        let slugs = dataset
            .genre_slugs(genre)
            .ok_or_else(|| ResolveError::UnknownGenre(genre.to_string()))?;
        for slug in slugs {
            slug_owner.entry(slug).or_insert_with(|| genre.to_string());
        }
    }

    let mut resolved = Resolved::default();
    for (slug, genre) in slug_owner {
        let id = dataset
            .playlist_id(slug)
            .ok_or_else(|| ResolveError::UnknownSlug {
                genre,
                slug: slug.clone(),
            })?;
        resolved.playlist_ids.insert(id.clone());
        resolved.slugs.insert(slug.clone());
    }

    trace!(
        "Resolved {} slugs to {} playlist ids",
        resolved.slugs.len(),
        resolved.playlist_ids.len()
    );
    Ok(resolved)
}

/// Resolve genres to the set of playlist ids they list
pub fn genres_to_playlists<I, S>(dataset: &Dataset, genres: I) -> Result<BTreeSet<PlaylistId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    genres_to_playlists_with_slugs(dataset, genres).map(|resolved| resolved.playlist_ids)
}

/// Every dataset genre not in `genres` and not the sentinel genre
///
/// Input genres unknown to the dataset are simply absent from the
/// universe, so they never show up in the result.
pub fn invert_genre_set<I, S>(dataset: &Dataset, genres: I) -> BTreeSet<Genre>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let selected: BTreeSet<String> = genres.into_iter().map(|g| g.as_ref().to_string()).collect();
    let sentinel = dataset.remove_genre();

    dataset
        .genre_names()
        .filter(|genre| genre.as_str() != sentinel && !selected.contains(genre.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dataset() -> Dataset {
        let mut dataset = Dataset::new("misc");
        dataset.insert_playlist("p1", "1");
        dataset.insert_playlist("p2", "2");
        dataset.insert_playlist("p3", "3");
        // Two slugs pointing at the same playlist
        dataset.insert_playlist("p3-alias", "3");

        dataset.insert_genre("rock", ["p1"]);
        dataset.insert_genre("pop", ["p2"]);
        dataset.insert_genre("indie", ["p1", "p3"]);
        dataset.insert_genre("lofi", ["p3-alias"]);
        dataset.insert_genre("misc", ["p1", "p2", "p3"]);
        dataset
    }

    fn ids(values: &[&str]) -> BTreeSet<PlaylistId> {
        values.iter().map(|v| PlaylistId::from(*v)).collect()
    }

    #[test]
    fn test_rock_pop_scenario() {
        let mut dataset = Dataset::new("misc");
        dataset.insert_playlist("p1", "1");
        dataset.insert_playlist("p2", "2");
        dataset.insert_genre("rock", ["p1"]);
        dataset.insert_genre("pop", ["p2"]);

        let inverted = invert_genre_set(&dataset, ["rock"]);
        assert_eq!(inverted, BTreeSet::from(["pop".to_string()]));

        assert_eq!(genres_to_playlists(&dataset, ["rock"]).unwrap(), ids(&["1"]));
        assert_eq!(genres_to_playlists(&dataset, &inverted).unwrap(), ids(&["2"]));
    }

    #[test]
    fn test_overlapping_genres_dedup_slugs_and_ids() {
        let dataset = create_test_dataset();

        let resolved = genres_to_playlists_with_slugs(&dataset, ["rock", "indie", "lofi"]).unwrap();

        assert_eq!(resolved.slugs.len(), 3); // p1, p3, p3-alias
        assert_eq!(resolved.playlist_ids, ids(&["1", "3"]));
    }

    #[test]
    fn test_empty_selection() {
        let dataset = create_test_dataset();
        let none: [&str; 0] = [];

        assert!(genres_to_playlists(&dataset, none).unwrap().is_empty());

        // Inverting nothing gives the whole universe minus the sentinel
        let inverted = invert_genre_set(&dataset, none);
        assert_eq!(inverted.len(), 4);
        assert!(!inverted.contains("misc"));
    }

    #[test]
    fn test_unknown_genre_fails() {
        let dataset = create_test_dataset();
        let err = genres_to_playlists(&dataset, ["rock", "polka"]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownGenre("polka".to_string()));
    }

    #[test]
    fn test_unknown_slug_fails() {
        let mut dataset = create_test_dataset();
        dataset.insert_genre("jazz", ["ghost"]);

        let err = genres_to_playlists(&dataset, ["jazz"]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownSlug {
                genre: "jazz".to_string(),
                slug: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_invert_properties_hold_for_every_subset() {
        let dataset = create_test_dataset();
        let universe: Vec<&Genre> = dataset.genre_names().collect();
        let sentinel = dataset.remove_genre();

        // Every subset of the universe, sentinel included
        for mask in 0u32..(1 << universe.len()) {
            let selected: BTreeSet<String> = universe
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u32 << *i) != 0)
                .map(|(_, g)| g.to_string())
                .collect();

            let inverted = invert_genre_set(&dataset, &selected);

            assert!(!inverted.contains(sentinel));
            assert!(inverted.is_disjoint(&selected));

            let mut union: BTreeSet<String> = inverted.clone();
            union.extend(selected.iter().filter(|g| g.as_str() != sentinel).cloned());
            let expected: BTreeSet<String> = universe
                .iter()
                .filter(|g| g.as_str() != sentinel)
                .map(|g| g.to_string())
                .collect();
            assert_eq!(union, expected);

            // Resolutions over both sides are plain sets of known ids
            let rejects = genres_to_playlists(&dataset, &inverted).unwrap();
            let inference = genres_to_playlists(&dataset, &selected).unwrap();
            assert!(rejects.len() <= 3 && inference.len() <= 3);
        }
    }

    #[test]
    fn test_invert_ignores_unknown_selected_genres() {
        let dataset = create_test_dataset();
        let inverted = invert_genre_set(&dataset, ["rock", "polka"]);
        assert!(!inverted.contains("polka"));
        assert!(!inverted.contains("rock"));
        assert_eq!(inverted.len(), 3);
    }
}
