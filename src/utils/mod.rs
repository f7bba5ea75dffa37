//! Cross-platform filesystem helpers.

pub mod fs;
