//! Error types for the save layer.
//!
//! None of these escape [`GameStore`](crate::GameStore): persistence
//! failures are logged and play continues in memory, and migration
//! failures fall back to a fresh state.

use std::path::PathBuf;

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key cannot be used as a storage name.
    #[error("invalid save key: {0}")]
    InvalidKey(String),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Why a persisted blob could not be migrated.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The blob is not valid JSON.
    #[error("save is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The blob fails the minimal shape check.
    #[error("save has unexpected shape: {0}")]
    Shape(&'static str),
}
