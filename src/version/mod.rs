//! Version comparison for loosely semantic-versioned plugin releases.
//!
//! Forge tags and plugin headers rarely carry strict semver: `v1.2`, `2.0`,
//! and `release-1.0.3` are all common. [`comparison::VersionComparator`]
//! accepts that reality with a semver fast path and a dotted-numeric
//! fallback, and fails closed on anything it cannot interpret.

pub mod comparison;

pub use comparison::VersionComparator;
