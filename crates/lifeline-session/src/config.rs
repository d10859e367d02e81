//! Session configuration.

use lifeline_core::error::StoryError;
use lifeline_core::id::NodeId;
use serde::{Deserialize, Serialize};

use crate::domain::countdown::CountdownRange;

/// Which nodes play which role, and how long the player survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where every playthrough begins.
    pub start_node_id: NodeId,
    /// Successful ending, and fallback for absent or malformed nodes.
    pub clear_node_id: NodeId,
    /// Forced ending entered when the countdown expires.
    pub end_node_id: NodeId,
    /// Range the countdown limit is drawn from.
    pub countdown: CountdownRange,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_node_id: NodeId::from("ep1"),
            clear_node_id: NodeId::from("ep_clear"),
            end_node_id: NodeId::from("ep_end"),
            countdown: CountdownRange::default(),
        }
    }
}

impl SessionConfig {
    /// Checks the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` for an empty node id or an invalid
    /// countdown range.
    pub fn validate(&self) -> Result<(), StoryError> {
        for (role, id) in [
            ("start", &self.start_node_id),
            ("clear", &self.clear_node_id),
            ("end", &self.end_node_id),
        ] {
            if id.as_str().trim().is_empty() {
                return Err(StoryError::Validation(format!("{role} node id is empty")));
            }
        }
        self.countdown.validate()
    }
}
