//! Cache error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for product cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The database file could not be opened or initialized.
    #[error("failed to open product cache at {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query or statement failed.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}
