//! The immutable in-memory story graph.

use std::collections::HashMap;
use std::sync::OnceLock;

use lifeline_core::error::StoryError;
use lifeline_core::id::NodeId;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LINE_BREAK_REGEX: OnceLock<Regex> = OnceLock::new();

fn line_break_pattern() -> &'static Regex {
    LINE_BREAK_REGEX
        .get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK_REGEX pattern is invalid"))
}

/// What a node does once its prompts are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Linear message sequence that follows `next`.
    Lines,
    /// Decision point that offers its choices after the last prompt.
    Choice,
}

/// How a prompt is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Narrative text, typed out character by character.
    #[default]
    Normal,
    /// System notice, shown at once.
    System,
    /// Sound/scene effect caption, shown at once.
    Effect,
}

impl PromptKind {
    /// Whether this kind of prompt is revealed with a typing animation.
    #[must_use]
    pub fn is_typed(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// A reference to a `next` target, normalized at load time.
///
/// A `Random` link is never pre-resolved; each traversal picks again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    /// Follow the clear (successful ending) path.
    #[default]
    Clear,
    /// Go to exactly this node.
    Single(NodeId),
    /// Go to one of these nodes, uniformly at random.
    Random(Vec<NodeId>),
}

impl Link {
    /// All node ids this link may lead to (excluding the implicit clear node).
    #[must_use]
    pub fn targets(&self) -> &[NodeId] {
        match self {
            Self::Clear => &[],
            Self::Single(id) => std::slice::from_ref(id),
            Self::Random(ids) => ids,
        }
    }
}

/// The raw total-text-count value attached to a node.
///
/// Stored as authored; coercion to a number happens when statistics are
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextCount {
    /// A numeric value.
    Number(f64),
    /// A string that may or may not hold a number.
    Text(String),
}

/// One renderable unit of text/imagery within a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Presentation style.
    pub kind: PromptKind,
    /// Text, possibly containing `<br>` line-break markers.
    pub text: String,
    /// Background image reference.
    pub image: Option<String>,
    /// Sound effect reference.
    pub sfx: Option<String>,
    /// Delay before the prompt appears.
    pub delay_ms: u64,
    /// Scene effect tag applied with the image (e.g. `shake`).
    pub scene_effect: Option<String>,
}

impl Prompt {
    /// A plain normal prompt with no cues.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Normal,
            text: text.into(),
            image: None,
            sfx: None,
            delay_ms: 0,
            scene_effect: None,
        }
    }

    /// The prompt text with every `<br>`, `<br/>` or `<br />` marker
    /// (case-insensitive) replaced by `\n`.
    #[must_use]
    pub fn display_text(&self) -> String {
        line_break_pattern().replace_all(&self.text, "\n").into_owned()
    }
}

/// A labelled option inside a choice node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Button text.
    pub label: String,
    /// Where the option leads.
    pub next: Link,
}

/// A unit of story content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Lines or choice.
    pub kind: NodeKind,
    /// Prompts, rendered strictly in order.
    pub prompts: Vec<Prompt>,
    /// Choices offered after the last prompt (choice nodes only).
    pub choices: Vec<Choice>,
    /// Follow-up for lines nodes.
    pub next: Link,
    /// Background music reference.
    pub bgm: Option<String>,
    /// Authored text count for statistics.
    pub total_text_count: Option<TextCount>,
}

impl Node {
    /// Checks that the node has what its kind requires.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::MalformedNode` for a node without prompts, or a
    /// choice node without choices.
    pub fn check(&self) -> Result<(), StoryError> {
        let reason = if self.prompts.is_empty() {
            "node has no prompts"
        } else if self.kind == NodeKind::Choice && self.choices.is_empty() {
            "choice node has no choices"
        } else {
            return Ok(());
        };
        Err(StoryError::MalformedNode {
            node_id: self.id.clone(),
            reason: reason.to_owned(),
        })
    }

    /// Every node id this node can lead to.
    pub fn outgoing(&self) -> impl Iterator<Item = &NodeId> {
        let choice_targets = self.choices.iter().flat_map(|c| c.next.targets());
        let next_targets = match self.kind {
            NodeKind::Lines => self.next.targets(),
            NodeKind::Choice => &[],
        };
        next_targets.iter().chain(choice_targets)
    }
}

/// Mapping from node id to node, read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryGraph {
    nodes: HashMap<NodeId, Node>,
    version_hash: String,
}

impl StoryGraph {
    /// Builds a graph from already-normalized nodes.
    #[must_use]
    pub fn new(nodes: impl IntoIterator<Item = Node>, version_hash: impl Into<String>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            version_hash: version_hash.into(),
        }
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether a node exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// SHA-256 hex digest of the source text.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}
