//! Deterministic configuration encoding.

use crate::{OptionMap, OptionValue};

/// The enumerate-named-options capability required of configuration objects.
///
/// Implementations must surface every option that affects analysis behavior.
/// An option left out of [`enumerate`](Options::enumerate) does not
/// participate in cache keying, so changing it would silently serve stale
/// results.
pub trait Options {
    /// Returns the full set of named options in the canonical value model.
    fn enumerate(&self) -> OptionMap;
}

impl Options for OptionMap {
    fn enumerate(&self) -> OptionMap {
        self.clone()
    }
}

/// Encodes a configuration into canonical deterministic bytes.
///
/// Two configurations with the same effective options produce identical
/// bytes regardless of construction or insertion order: nested maps encode
/// with keys sorted lexicographically and sets as sorted sequences.
pub fn canonical_bytes<O: Options + ?Sized>(options: &O) -> Vec<u8> {
    let tree = OptionValue::Map(options.enumerate()).to_canonical();
    serde_json::to_vec(&tree).unwrap_or_default()
}
