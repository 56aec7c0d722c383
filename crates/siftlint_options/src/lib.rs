//! # siftlint_options
//!
//! Canonical option model shared between the linter front-end and the result
//! cache.
//!
//! Analysis results can only be reused when the configuration that produced
//! them is byte-for-byte identifiable. This crate defines the closed set of
//! value shapes options may take ([`OptionValue`]), the capability
//! configuration objects must expose ([`Options`]), and the deterministic
//! encoding ([`canonical_bytes`]) that makes a configuration hashable.

mod canonical;
mod value;

pub use canonical::{Options, canonical_bytes};
pub use value::{OptionMap, OptionValue};
