//! The link-resolution rule.
//!
//! Every `next` value, whether on a node or a choice, becomes a concrete node
//! id here and nowhere else.

use lifeline_core::id::NodeId;
use lifeline_core::rng::DeterministicRng;
use lifeline_story::domain::graph::Link;

/// Turns `link` into a node id. `Random` links draw afresh on every call.
pub fn resolve_link(link: &Link, clear_node_id: &NodeId, rng: &mut dyn DeterministicRng) -> NodeId {
    match link {
        Link::Clear => clear_node_id.clone(),
        Link::Single(id) => id.clone(),
        Link::Random(ids) => ids
            .get(rng.pick_index(ids.len()))
            .unwrap_or(clear_node_id)
            .clone(),
    }
}
