//! # Data Loader Crate
//!
//! This crate loads the playlist dataset: the static JSON document that
//! maps playlist slugs to ids, genres to playlist slugs, and carries the
//! model table and dataset config.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (PlaylistId, Dataset, DatasetConfig)
//! - **parser**: Parse the JSON document into a `Dataset`
//! - **index**: Loading entry points and integrity checks
//! - **error**: Error types for dataset loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load(Path::new("dataset.json"))?;
//!
//! let slugs = dataset.genre_slugs("rock").unwrap_or_default();
//! let id = dataset.playlist_id("indie-mix");
//! println!("sentinel genre: {}", dataset.remove_genre());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DatasetLoadError, Result};
pub use types::{
    // Type aliases
    Genre,
    ModelName,
    PlaylistSlug,
    // Core types
    Dataset,
    DatasetConfig,
    PlaylistId,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::new("misc");
        let (playlists, genres, models) = dataset.counts();

        assert_eq!(playlists, 0);
        assert_eq!(genres, 0);
        assert_eq!(models, 0);
        assert_eq!(dataset.remove_genre(), "misc");
    }

    #[test]
    fn test_insert_genre_and_playlist() {
        let mut dataset = Dataset::new("misc");
        dataset.insert_playlist("indie-mix", "37i9dQ");
        dataset.insert_genre("indie", ["indie-mix"]);

        assert_eq!(dataset.genre_slugs("indie"), Some(&["indie-mix".to_string()][..]));
        assert_eq!(
            dataset.playlist_id("indie-mix"),
            Some(&PlaylistId::Text("37i9dQ".to_string()))
        );
        assert!(dataset.has_genre("indie"));
    }

    #[test]
    fn test_playlist_id_keeps_json_type() {
        let ids: Vec<PlaylistId> = serde_json::from_str(r#"["abc", 42]"#).unwrap();
        assert_eq!(ids, vec![PlaylistId::from("abc"), PlaylistId::from(42_i64)]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"["abc",42]"#);
        assert_eq!(ids[1].to_string(), "42");
    }

    #[test]
    fn test_empty_queries() {
        let dataset = Dataset::new("misc");

        assert!(dataset.genre_slugs("rock").is_none());
        assert!(dataset.playlist_id("p1").is_none());
        assert!(!dataset.has_model("baseline"));
        assert_eq!(dataset.genre_names().count(), 0);
    }
}
