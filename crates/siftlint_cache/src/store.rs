//! Cache directory management and eviction.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::CacheError;

/// Environment variable overriding the cache directory location.
pub const CACHE_DIR_ENV: &str = "SIFTLINT_CACHE_DIR";

/// Environment variable overriding the staleness threshold, in seconds.
pub const CACHE_TIMEOUT_ENV: &str = "SIFTLINT_CACHE_TIMEOUT";

/// Entries not accessed for this long are evicted. One day.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(60 * 60 * 24);

const ENTRY_EXTENSION: &str = "json";

/// The shared on-disk cache directory and its eviction policy.
///
/// One `CacheDir` is constructed per process and [`prepare`](CacheDir::prepare)d
/// before any snapshot activity. Construction is explicit so tests can
/// inject a temporary directory and a short threshold.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
    threshold: Duration,
}

impl CacheDir {
    /// Creates a cache directory with an explicit root and staleness
    /// threshold.
    pub fn new(root: impl Into<PathBuf>, threshold: Duration) -> Self {
        Self {
            root: root.into(),
            threshold,
        }
    }

    /// Creates a cache directory from the process environment.
    ///
    /// `SIFTLINT_CACHE_DIR` overrides the location; the default is the
    /// per-user cache directory (`~/.cache/siftlint` on Linux), falling back
    /// to `.siftlint-cache` in the working directory when no user cache
    /// directory exists. `SIFTLINT_CACHE_TIMEOUT` overrides the staleness
    /// threshold in seconds; the default is 86400 (one day).
    pub fn from_env() -> Self {
        let root = env::var_os(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_root);
        let threshold = env::var(CACHE_TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_THRESHOLD);

        Self { root, threshold }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the staleness threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Makes the directory ready for snapshot traffic.
    ///
    /// Creates it (with parents) if absent; a freshly created directory has
    /// nothing to prune. An existing directory gets one eviction sweep.
    pub fn prepare(&self) -> Result<(), CacheError> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            debug!("created cache directory {}", self.root.display());
            return Ok(());
        }

        self.prune()?;
        Ok(())
    }

    /// Evicts entries whose last access is older than the threshold.
    ///
    /// The sweep reads metadata only and does not refresh access times
    /// itself. Entries removed concurrently by another process count as
    /// already gone. Returns the number of evicted entries.
    pub fn prune(&self) -> Result<usize, CacheError> {
        let now = SystemTime::now();
        let mut evicted = 0;

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            // Filesystems without access times fall back to mtime.
            let last_access = metadata.accessed().or_else(|_| metadata.modified())?;
            let age = now.duration_since(last_access).unwrap_or_default();
            if age <= self.threshold {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!("evicted stale cache entry {}", entry.path().display());
                    evicted += 1;
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        if evicted > 0 {
            info!(
                "evicted {} stale cache entries from {}",
                evicted,
                self.root.display()
            );
        }

        Ok(evicted)
    }

    /// Returns the storage location for a cache key.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{ENTRY_EXTENSION}"))
    }
}

fn default_root() -> PathBuf {
    match dirs::cache_dir() {
        Some(mut dir) => {
            dir.push("siftlint");
            dir
        }
        None => PathBuf::from(".siftlint-cache"),
    }
}
