//! Player configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lifeline_core::id::NodeId;
use lifeline_session::config::SessionConfig;
use lifeline_session::domain::countdown::CountdownRange;

use crate::error::AppError;

/// Where the story lives when `LIFELINE_STORY_PATH` is unset.
pub const DEFAULT_STORY_PATH: &str = "data/story.yaml";

/// Typewriter pace when `LIFELINE_TYPING_MS` is unset.
pub const DEFAULT_TYPING_MS: u64 = 25;

/// Everything the player needs before it can start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Story file, YAML or JSON by extension.
    pub story_path: PathBuf,
    /// Node roles and countdown range.
    pub session: SessionConfig,
    /// Delay between typed characters. Zero prints prompts at once.
    pub typing_delay: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            story_path: PathBuf::from(DEFAULT_STORY_PATH),
            session: SessionConfig::default(),
            typing_delay: Duration::from_millis(DEFAULT_TYPING_MS),
        }
    }
}

impl PlayerConfig {
    /// Reads the `LIFELINE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse or the resulting
    /// session configuration is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse or the resulting
    /// session configuration is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let node = |key: &str, fallback: NodeId| {
            lookup(key).map_or(fallback, |value| NodeId::from(value.trim()))
        };

        let session = SessionConfig {
            start_node_id: node("LIFELINE_START_NODE", defaults.session.start_node_id),
            clear_node_id: node("LIFELINE_CLEAR_NODE", defaults.session.clear_node_id),
            end_node_id: node("LIFELINE_END_NODE", defaults.session.end_node_id),
            countdown: CountdownRange {
                min_seconds: parse_or(
                    &lookup,
                    "LIFELINE_COUNTDOWN_MIN",
                    defaults.session.countdown.min_seconds,
                )?,
                max_seconds: parse_or(
                    &lookup,
                    "LIFELINE_COUNTDOWN_MAX",
                    defaults.session.countdown.max_seconds,
                )?,
            },
        };
        session
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            story_path: lookup("LIFELINE_STORY_PATH").map_or(defaults.story_path, PathBuf::from),
            session,
            typing_delay: Duration::from_millis(parse_or(
                &lookup,
                "LIFELINE_TYPING_MS",
                DEFAULT_TYPING_MS,
            )?),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    fallback: T,
) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a non-negative integer, got `{raw}`"))),
    }
}
