use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading the canonical list (or a single player) from the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid catalog payload: {0}")]
    Parse(String),
    #[error("catalog provider unavailable")]
    Unavailable,
}

/// Storage read/write failure for the favorite blob. Never fatal; it travels as the
/// `warning` of a favorites update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("failed reading {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed writing {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("failed encoding favorites: {0}")]
    Encode(String),
    #[error("stored favorites for `{key}` are unreadable: {message}")]
    Decode { key: String, message: String },
    #[error("no storage location available")]
    NoLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("player {id} is not available")]
    NotFound { id: String },
}

impl CatalogError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}
