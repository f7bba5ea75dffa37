//! Core types shared across the updater.
//!
//! The error types here mirror the three failure domains of the update
//! pipeline:
//!
//! - [`FetchError`] - anything that goes wrong talking to the forge. All
//!   variants are treated identically by the resolver: no update is
//!   advertised (fail closed).
//! - [`RelocateError`] - the extracted archive did not match any recognized
//!   layout, or a directory move failed. Non-fatal; callers fall back to the
//!   host's default behavior.
//! - [`ConfigError`] - the plugin is not (or incorrectly) bound to a forge
//!   repository. The update mechanism is disabled silently for that plugin.

pub mod error;

pub use error::{ConfigError, FetchError, RelocateError};
