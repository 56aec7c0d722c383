//! Cache error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the result cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A persisted entry exists but cannot be decoded.
    ///
    /// Surfaced as its own kind so callers can tell a damaged cache
    /// directory apart from an ordinary miss. Higher layers may catch this
    /// and fall back to recompute-and-overwrite.
    #[error("corrupted cache entry at {path}: {reason}")]
    Corrupted {
        /// Location of the damaged entry.
        path: PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Findings could not be encoded for storage.
    #[error("failed to encode cache entry: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Creates a corrupted-entry error.
    pub fn corrupted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the corrupted-entry kind.
    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }
}
