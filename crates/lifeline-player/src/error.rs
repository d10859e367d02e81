//! Lifeline player — error types.

use lifeline_core::error::StoryError;
use thiserror::Error;

/// Startup and runtime errors for the terminal player.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The story could not be loaded or played.
    #[error(transparent)]
    Story(#[from] StoryError),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
