//! Error types for playlist resolution.

use thiserror::Error;

/// Lookups that failed against the dataset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A selected genre is not part of the dataset's genre universe
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    /// A genre lists a slug that has no playlist entry
    #[error("Genre {genre} lists slug {slug} with no playlist id")]
    UnknownSlug { genre: String, slug: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
