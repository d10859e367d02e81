//! Loading and validating story graphs.

pub mod loader;
pub mod validation;
