//! The persisted cache entry.

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::CacheError;

/// One persisted cache record: the content digest at write time and the
/// findings computed for that content.
///
/// The findings payload is opaque to the cache; it round-trips through serde
/// exactly as the caller's type serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<F> {
    /// Content digest of the target file when the entry was written.
    pub digest: String,

    /// The cached findings.
    pub results: Vec<F>,
}

impl<F> CacheEntry<F> {
    /// Creates a new entry.
    pub fn new(digest: impl Into<String>, results: Vec<F>) -> Self {
        Self {
            digest: digest.into(),
            results,
        }
    }

    /// Returns true if the stored digest matches `digest`.
    pub fn is_fresh(&self, digest: &str) -> bool {
        self.digest == digest
    }
}

impl<F: DeserializeOwned> CacheEntry<F> {
    /// Reads the entry at `path`.
    ///
    /// A missing file is `Ok(None)`: entries may vanish at any moment under
    /// concurrent eviction. A file that cannot be decoded is
    /// [`CacheError::Corrupted`].
    pub fn read(path: &Path) -> Result<Option<Self>, CacheError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| CacheError::corrupted(path, err.to_string()))
    }
}

impl<F: Serialize> CacheEntry<F> {
    /// Writes the entry to `path`, replacing any previous content.
    ///
    /// The record goes to a process-unique sibling file first and is renamed
    /// into place, so a concurrent reader sees either the old entry or the
    /// new one, never a partial write.
    pub fn write(&self, path: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string(self)
            .map_err(|err| CacheError::Serialization(err.to_string()))?;

        let staging = path.with_extension(format!("tmp{}", process::id()));
        if let Err(err) = fs::write(&staging, json) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        Ok(())
    }
}
