//! Catalog and favorites data layer for the player browser screens.
//!
//! The canonical player list comes from a read-only API ([`catalog_fetch`]), favorite ids
//! live in one persisted [`favorites::FavoriteStore`], and every screen renders rows from
//! the pure functions in [`views`]. [`catalog::Catalog`] ties them together.

pub mod catalog;
pub mod catalog_fetch;
pub mod config;
pub mod error;
pub mod favorites;
pub mod http_client;
pub mod persist;
pub mod provider;
pub mod state;
pub mod views;

pub use catalog::Catalog;
pub use catalog_fetch::{CatalogSource, HttpCatalogSource};
pub use config::CatalogConfig;
pub use error::{CatalogError, FetchError, PersistenceError};
pub use favorites::{Confirmation, FavoriteIntent, FavoriteSet, FavoriteStore, FavoriteUpdate};
pub use persist::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use state::{CatalogState, Player};
pub use views::{PlayerRow, Screen, TeamFilter, ViewQuery};
