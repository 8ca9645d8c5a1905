//! # Resolver Crate
//!
//! Maps genre selections to playlist sets using the loaded dataset.
//!
//! ## Components
//!
//! - **genres**: pure functions `genres_to_playlists` and `invert_genre_set`
//! - **resolver**: `PlaylistResolver`, the same operations bound to an
//!   `Arc<Dataset>`, plus `resolve` for deriving a run's three categories
//!
//! ## Example Usage
//!
//! ```ignore
//! use resolver::PlaylistResolver;
//! use std::sync::Arc;
//!
//! let resolver = PlaylistResolver::new(Arc::new(dataset));
//! let inference = resolver.genres_to_playlists(["rock", "indie"])?;
//! let rejected = resolver.invert_genre_set(["rock", "indie"]);
//! let reject = resolver.genres_to_playlists(&rejected)?;
//! ```

pub mod error;
pub mod genres;
pub mod resolver;
pub mod types;

pub use error::ResolveError;
pub use genres::{genres_to_playlists, genres_to_playlists_with_slugs, invert_genre_set};
pub use resolver::PlaylistResolver;
pub use types::{PlaylistSets, Resolved};
