//! Per-file cache snapshots.

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use siftlint_options::{Options, canonical_bytes};
use tracing::debug;

use crate::{CacheDir, CacheEntry, CacheError};

/// The cached association between one (configuration, file) pair and the
/// findings previously computed for that file.
///
/// A snapshot is built fresh for each file of each run, asked whether a
/// valid entry [`exists`](Snapshot::exists), and either read on a hit
/// ([`results`](Snapshot::results)) or written after the analysis ran
/// ([`save`](Snapshot::save)). It is held by a single caller and lives only
/// for the duration of one file's check.
#[derive(Debug)]
pub struct Snapshot<F> {
    cache_path: PathBuf,
    file_path: PathBuf,
    digest: Option<String>,
    valid: Option<bool>,
    findings: Option<Vec<F>>,
}

impl<F> Snapshot<F> {
    /// Derives the snapshot for `options` and `target`.
    ///
    /// The cache key digests the canonical encoding of the full effective
    /// configuration together with the resolved absolute target path: any
    /// option change moves every file to a new key, and two spellings of the
    /// same path share one. Derivation never reads the target's contents
    /// and never touches the cache directory.
    pub fn derive<O>(cache: &CacheDir, options: &O, target: impl AsRef<Path>) -> Self
    where
        O: Options + ?Sized,
    {
        let file_path = absolutize(target.as_ref());

        let mut hasher = blake3::Hasher::new();
        hasher.update(&canonical_bytes(options));
        hasher.update(file_path.to_string_lossy().as_bytes());
        let key = hasher.finalize().to_hex();

        Self {
            cache_path: cache.entry_path(key.as_str()),
            file_path,
            digest: None,
            valid: None,
            findings: None,
        }
    }

    /// The storage location backing this snapshot.
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// The resolved path of the file under analysis.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Digest of the target's current bytes, memoized once computed.
    ///
    /// `None` when the target cannot be read — analysis input that is not a
    /// real file, such as stdin.
    fn content_digest(&mut self) -> Option<&str> {
        if self.digest.is_none() {
            let bytes = fs::read(&self.file_path).ok()?;
            self.digest = Some(blake3::hash(&bytes).to_hex().to_string());
        }
        self.digest.as_deref()
    }
}

impl<F: Serialize + DeserializeOwned> Snapshot<F> {
    /// Returns true if a stored entry exists and still matches the target's
    /// current content.
    ///
    /// The answer is memoized for the lifetime of the snapshot. On a hit the
    /// stored findings are retained in memory, so the following
    /// [`results`](Snapshot::results) call does not read storage again. A
    /// snapshot whose target cannot be read is never valid. An entry that
    /// exists but cannot be decoded is [`CacheError::Corrupted`], not a
    /// miss.
    pub fn exists(&mut self) -> Result<bool, CacheError> {
        if let Some(valid) = self.valid {
            return Ok(valid);
        }

        if !self.cache_path.exists() {
            self.valid = Some(false);
            return Ok(false);
        }

        let Some(digest) = self.content_digest().map(str::to_owned) else {
            self.valid = Some(false);
            return Ok(false);
        };

        // The entry may be evicted between the probe above and this read;
        // that is an ordinary miss.
        let Some(entry) = CacheEntry::<F>::read(&self.cache_path)? else {
            self.valid = Some(false);
            return Ok(false);
        };

        let valid = entry.is_fresh(&digest);
        if valid {
            debug!("cache hit for {}", self.file_path.display());
            self.findings = Some(entry.results);
        } else {
            debug!("stale cache entry for {}", self.file_path.display());
        }
        self.valid = Some(valid);
        Ok(valid)
    }

    /// Persists `findings` for the target's current content.
    ///
    /// Reuses the digest computed by a prior [`exists`](Snapshot::exists)
    /// call, computing it now otherwise. Nothing is written for a target
    /// that cannot be read, since such an entry could never validate. The
    /// write replaces any previous entry atomically.
    pub fn save(&mut self, findings: Vec<F>) -> Result<(), CacheError> {
        let Some(digest) = self.content_digest().map(str::to_owned) else {
            debug!(
                "skipping cache write for unreadable target {}",
                self.file_path.display()
            );
            return Ok(());
        };

        let entry = CacheEntry::new(digest, findings);
        entry.write(&self.cache_path)?;
        debug!(
            "cached {} findings for {}",
            entry.results.len(),
            self.file_path.display()
        );
        self.findings = Some(entry.results);
        Ok(())
    }

    /// Returns the cached findings for this file.
    ///
    /// The copy loaded by a successful [`exists`](Snapshot::exists) or kept
    /// by [`save`](Snapshot::save) is handed out without touching storage;
    /// findings are retrieved once per snapshot, so that in-memory copy is
    /// consumed. Otherwise the persisted entry is read and decoded. Callers
    /// must check validity first; without a valid entry this surfaces the
    /// underlying read error.
    pub fn results(&mut self) -> Result<Vec<F>, CacheError> {
        if let Some(findings) = self.findings.take() {
            return Ok(findings);
        }

        match CacheEntry::<F>::read(&self.cache_path)? {
            Some(entry) => Ok(entry.results),
            None => Err(CacheError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no cache entry at {}", self.cache_path.display()),
            ))),
        }
    }
}

/// Resolves `path` to an absolute canonical form so different spellings of
/// the same file derive the same key. Paths that do not exist on disk
/// (stdin placeholders) are normalized lexically instead.
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
