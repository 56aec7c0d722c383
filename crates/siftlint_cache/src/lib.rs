//! # siftlint_cache
//!
//! Result cache for siftlint analysis runs.
//!
//! Re-running analysis over a file is pointless when neither the file's
//! bytes nor the effective configuration changed since the previous run.
//! This crate persists one entry per (configuration, file) pair and guards
//! it with a content digest:
//!
//! 1. **Content-addressable keys**: the cache key digests the canonical
//!    configuration encoding plus the resolved file path, so any option
//!    change invalidates every entry at once.
//! 2. **Digest-guarded entries**: an entry is only served while the target's
//!    live digest matches the one stored alongside the findings.
//! 3. **Time-based eviction**: entries unread past a staleness threshold are
//!    swept at startup.
//!
//! The cache is advisory and self-healing: losing an entry forces a
//! recompute, never a failure.

mod entry;
mod error;
mod snapshot;
mod store;

pub use entry::CacheEntry;
pub use error::CacheError;
pub use snapshot::Snapshot;
pub use store::{CACHE_DIR_ENV, CACHE_TIMEOUT_ENV, CacheDir, DEFAULT_THRESHOLD};
