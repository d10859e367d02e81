//! On-disk story records and their normalization into the graph model.
//!
//! Both field vocabularies are accepted: the compact one used by published
//! story files (`node_tp`, `msg_list`, `next_ids`, ...) and a descriptive one
//! (`type`, `prompts`, `next`, ...).

use std::collections::BTreeMap;

use lifeline_core::id::NodeId;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::graph::{Choice, Link, Node, NodeKind, Prompt, PromptKind, TextCount};

/// Top-level story document.
#[derive(Debug, Deserialize)]
pub struct StoryRecord {
    /// Node records keyed by node id.
    #[serde(alias = "nodes")]
    pub node_dict: BTreeMap<String, NodeRecord>,
}

/// A node as authored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    #[serde(alias = "id")]
    pub node_id: Option<String>,
    #[serde(alias = "type")]
    pub node_tp: Option<String>,
    #[serde(alias = "prompts")]
    pub msg_list: Vec<PromptRecord>,
    pub choices: Vec<ChoiceRecord>,
    #[serde(alias = "next")]
    pub next_ids: Option<Value>,
    #[serde(alias = "bgm")]
    pub bgm_src: Option<String>,
    #[serde(alias = "total_text_count")]
    pub txt_cnt: Option<Value>,
}

/// A prompt as authored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromptRecord {
    #[serde(alias = "type")]
    pub msg_tp: Option<String>,
    #[serde(alias = "text")]
    pub msg_tx: Option<String>,
    #[serde(alias = "img", alias = "image")]
    pub img_src: Option<String>,
    #[serde(alias = "sfx")]
    pub sfx_src: Option<String>,
    #[serde(alias = "delay_ms")]
    pub dly_ms: Option<Value>,
    #[serde(alias = "scene_effect")]
    pub scn_fx: Option<String>,
}

/// A choice as authored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChoiceRecord {
    #[serde(alias = "text", alias = "label")]
    pub msg_tx: Option<String>,
    #[serde(alias = "next")]
    pub next_ids: Option<Value>,
}

impl NodeKind {
    fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "lines" => Some(Self::Lines),
            "choice" => Some(Self::Choice),
            _ => None,
        }
    }
}

impl PromptKind {
    fn parse(tag: Option<&str>) -> Option<Self> {
        match tag.map(str::trim) {
            None | Some("normal_msg" | "normal") => Some(Self::Normal),
            Some("system_msg" | "system") => Some(Self::System),
            Some("effect_msg" | "effect") => Some(Self::Effect),
            Some(_) => None,
        }
    }
}

impl Link {
    /// Normalizes a raw `next` value. Never fails: unusable shapes become
    /// `Link::Clear`.
    #[must_use]
    pub fn from_value(owner: &str, value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Clear,
            Some(Value::String(id)) if id.is_empty() => Self::Clear,
            Some(Value::String(id)) => Self::Single(NodeId::from(id.as_str())),
            Some(Value::Array(items)) => {
                let ids: Vec<NodeId> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(id) if !id.is_empty() => Some(NodeId::from(id.as_str())),
                        other => {
                            warn!(node_id = owner, entry = %other, "dropping unusable link entry");
                            None
                        }
                    })
                    .collect();
                if ids.is_empty() {
                    Self::Clear
                } else {
                    Self::Random(ids)
                }
            }
            Some(other) => {
                warn!(node_id = owner, value = %other, "unsupported link shape, following clear path");
                Self::Clear
            }
        }
    }
}

/// Keeps numbers and strings as authored; statistics coerce them later.
/// Any other shape counts as no text.
fn text_count_from_value(owner: &str, value: Option<&Value>) -> Option<TextCount> {
    match value? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(TextCount::Number),
        Value::String(s) => Some(TextCount::Text(s.clone())),
        other => {
            warn!(node_id = owner, value = %other, "unusable text count, counting as zero");
            None
        }
    }
}

/// Milliseconds from a number or a numeric string. Anything else, including
/// negative values, means no delay.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn delay_from_value(owner: &str, value: Option<&Value>) -> u64 {
    let millis = match value {
        None | Some(Value::Null) => return 0,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match millis {
        Some(ms) if ms.is_finite() && ms >= 0.0 => ms as u64,
        _ => {
            warn!(node_id = owner, value = ?value, "unusable prompt delay, showing at once");
            0
        }
    }
}

impl NodeRecord {
    /// Converts the record keyed under `key` into a graph node.
    ///
    /// Returns `None` when the node type is missing or unknown; such nodes are
    /// left out of the graph.
    #[must_use]
    pub fn into_node(self, key: &str) -> Option<Node> {
        if let Some(declared) = self.node_id.as_deref().filter(|d| *d != key) {
            warn!(key, declared, "node id differs from its key, using the key");
        }

        let Some(kind) = self.node_tp.as_deref().and_then(NodeKind::parse) else {
            warn!(node_id = key, node_type = ?self.node_tp, "skipping node with unknown type");
            return None;
        };

        let prompts = self
            .msg_list
            .into_iter()
            .map(|p| p.into_prompt(key))
            .collect();

        let choices = self
            .choices
            .into_iter()
            .map(|c| Choice {
                label: c.msg_tx.unwrap_or_default(),
                next: Link::from_value(key, c.next_ids.as_ref()),
            })
            .collect();

        Some(Node {
            id: NodeId::from(key),
            kind,
            prompts,
            choices,
            next: Link::from_value(key, self.next_ids.as_ref()),
            bgm: self.bgm_src.filter(|s| !s.is_empty()),
            total_text_count: text_count_from_value(key, self.txt_cnt.as_ref()),
        })
    }
}

impl PromptRecord {
    fn into_prompt(self, node_id: &str) -> Prompt {
        let kind = PromptKind::parse(self.msg_tp.as_deref()).unwrap_or_else(|| {
            warn!(node_id, prompt_type = ?self.msg_tp, "unknown prompt type, treating as normal");
            PromptKind::Normal
        });
        Prompt {
            kind,
            text: self.msg_tx.unwrap_or_default(),
            image: self.img_src.filter(|s| !s.is_empty()),
            sfx: self.sfx_src.filter(|s| !s.is_empty()),
            delay_ms: delay_from_value(node_id, self.dly_ms.as_ref()),
            scene_effect: self.scn_fx.filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_link_from_null_and_empty_is_clear() {
        assert_eq!(Link::from_value("n", None), Link::Clear);
        assert_eq!(Link::from_value("n", Some(&Value::Null)), Link::Clear);
        assert_eq!(Link::from_value("n", Some(&json!([]))), Link::Clear);
        assert_eq!(Link::from_value("n", Some(&json!(""))), Link::Clear);
    }

    #[test]
    fn test_link_from_string_is_single() {
        assert_eq!(
            Link::from_value("n", Some(&json!("ep2"))),
            Link::Single(NodeId::from("ep2"))
        );
    }

    #[test]
    fn test_link_from_sequence_is_random_over_strings() {
        let link = Link::from_value("n", Some(&json!(["x", 3, "", "y"])));

        assert_eq!(
            link,
            Link::Random(vec![NodeId::from("x"), NodeId::from("y")])
        );
    }

    #[test]
    fn test_link_from_other_shapes_is_clear() {
        assert_eq!(Link::from_value("n", Some(&json!(42))), Link::Clear);
        assert_eq!(Link::from_value("n", Some(&json!({"id": "x"}))), Link::Clear);
        assert_eq!(Link::from_value("n", Some(&json!([1, 2]))), Link::Clear);
    }

    #[test]
    fn test_node_record_with_compact_fields() {
        let record: NodeRecord = serde_json::from_value(json!({
            "node_id": "ep1",
            "node_tp": "lines",
            "msg_list": [
                { "msg_tp": "system_msg", "msg_tx": "Wake up.", "dly_ms": 300 },
                { "msg_tp": "normal_msg", "msg_tx": "Cold.", "img_src": "a.png", "scn_fx": "shake" }
            ],
            "next_ids": "ep2",
            "bgm_src": "theme.mp3",
            "txt_cnt": "12"
        }))
        .unwrap();

        let node = record.into_node("ep1").unwrap();

        assert_eq!(node.kind, NodeKind::Lines);
        assert_eq!(node.prompts.len(), 2);
        assert_eq!(node.prompts[0].kind, PromptKind::System);
        assert_eq!(node.prompts[0].delay_ms, 300);
        assert_eq!(node.prompts[1].image.as_deref(), Some("a.png"));
        assert_eq!(node.prompts[1].scene_effect.as_deref(), Some("shake"));
        assert_eq!(node.next, Link::Single(NodeId::from("ep2")));
        assert_eq!(node.bgm.as_deref(), Some("theme.mp3"));
        assert_eq!(node.total_text_count, Some(TextCount::Text("12".into())));
    }

    #[test]
    fn test_node_record_with_descriptive_fields() {
        let record: NodeRecord = serde_json::from_value(json!({
            "type": "choice",
            "prompts": [{ "type": "effect", "text": "Bang!" }],
            "choices": [
                { "label": "Run", "next": ["x", "y"] },
                { "text": "Hide", "next": null }
            ],
            "total_text_count": 40
        }))
        .unwrap();

        let node = record.into_node("ep3").unwrap();

        assert_eq!(node.id, NodeId::from("ep3"));
        assert_eq!(node.kind, NodeKind::Choice);
        assert_eq!(node.prompts[0].kind, PromptKind::Effect);
        assert_eq!(node.choices.len(), 2);
        assert_eq!(node.choices[0].label, "Run");
        assert_eq!(node.choices[1].next, Link::Clear);
        assert_eq!(node.total_text_count, Some(TextCount::Number(40.0)));
    }

    #[test]
    fn test_odd_text_count_and_delay_degrade_instead_of_failing() {
        let record: NodeRecord = serde_json::from_value(json!({
            "node_tp": "lines",
            "msg_list": [
                { "msg_tx": "a", "dly_ms": "300" },
                { "msg_tx": "b", "dly_ms": -5 },
                { "msg_tx": "c", "dly_ms": "soon" },
                { "msg_tx": "d", "dly_ms": 12.7 }
            ],
            "txt_cnt": true
        }))
        .unwrap();

        let node = record.into_node("ep1").unwrap();

        let delays: Vec<u64> = node.prompts.iter().map(|p| p.delay_ms).collect();
        assert_eq!(delays, vec![300, 0, 0, 12]);
        assert_eq!(node.total_text_count, None);
    }

    #[test]
    fn test_unknown_node_type_is_skipped() {
        let record: NodeRecord =
            serde_json::from_value(json!({ "node_tp": "cutscene", "msg_list": [] })).unwrap();

        assert!(record.into_node("ep9").is_none());
    }

    #[test]
    fn test_unknown_prompt_type_falls_back_to_normal() {
        let record: NodeRecord = serde_json::from_value(json!({
            "node_tp": "lines",
            "msg_list": [{ "msg_tp": "whisper_msg", "msg_tx": "psst" }]
        }))
        .unwrap();

        let node = record.into_node("ep4").unwrap();

        assert_eq!(node.prompts[0].kind, PromptKind::Normal);
        assert_eq!(node.next, Link::Clear);
    }
}
