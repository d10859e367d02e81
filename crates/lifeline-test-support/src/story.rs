//! Story fixtures — a terse builder for in-memory graphs.

use lifeline_core::id::NodeId;
use lifeline_story::domain::graph::{
    Choice, Link, Node, NodeKind, Prompt, StoryGraph, TextCount,
};

/// A link to exactly one node.
#[must_use]
pub fn single(id: &str) -> Link {
    Link::Single(NodeId::from(id))
}

/// A link to one of several nodes, picked at random.
#[must_use]
pub fn random(ids: &[&str]) -> Link {
    Link::Random(ids.iter().map(|id| NodeId::from(*id)).collect())
}

/// A choice with the given label and target.
#[must_use]
pub fn choice(label: &str, next: Link) -> Choice {
    Choice {
        label: label.to_owned(),
        next,
    }
}

/// Builds a `StoryGraph` node by node.
#[derive(Debug, Default)]
pub struct StoryBuilder {
    nodes: Vec<Node>,
}

impl StoryBuilder {
    /// Starts an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lines node with one normal prompt per entry of `prompts`.
    #[must_use]
    pub fn lines(mut self, id: &str, prompts: &[&str], next: Link) -> Self {
        self.nodes.push(Node {
            id: NodeId::from(id),
            kind: NodeKind::Lines,
            prompts: prompts.iter().map(|t| Prompt::text(*t)).collect(),
            choices: Vec::new(),
            next,
            bgm: None,
            total_text_count: None,
        });
        self
    }

    /// Adds a choice node.
    #[must_use]
    pub fn choice(mut self, id: &str, prompts: &[&str], choices: Vec<Choice>) -> Self {
        self.nodes.push(Node {
            id: NodeId::from(id),
            kind: NodeKind::Choice,
            prompts: prompts.iter().map(|t| Prompt::text(*t)).collect(),
            choices,
            next: Link::Clear,
            bgm: None,
            total_text_count: None,
        });
        self
    }

    /// Adds a fully specified node.
    #[must_use]
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Sets the text count of the most recently added node.
    ///
    /// # Panics
    ///
    /// Panics if no node has been added yet.
    #[must_use]
    pub fn text_count(mut self, count: TextCount) -> Self {
        let last = self
            .nodes
            .last_mut()
            .expect("text_count called before any node was added");
        last.total_text_count = Some(count);
        self
    }

    /// Sets the background music of the most recently added node.
    ///
    /// # Panics
    ///
    /// Panics if no node has been added yet.
    #[must_use]
    pub fn bgm(mut self, bgm: &str) -> Self {
        let last = self
            .nodes
            .last_mut()
            .expect("bgm called before any node was added");
        last.bgm = Some(bgm.to_owned());
        self
    }

    /// Finishes the graph.
    #[must_use]
    pub fn build(self) -> StoryGraph {
        StoryGraph::new(self.nodes, "test-fixture")
    }
}
