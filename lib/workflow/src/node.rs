//! Workflow node types.
//!
//! Nodes are the building blocks of workflows. Each node has:
//! - A unique ID within the workflow
//! - A kind (trigger, action, condition, transformer, webhook)
//! - A display label
//! - Ports, either stored explicitly or derived from the kind
//! - An opaque parameter bag

use crate::port::NodePorts;
use flowsmith_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The parameter bag of a node.
pub type Params = serde_json::Map<String, JsonValue>;

/// The kind of a workflow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry point that starts the workflow.
    Trigger,
    /// Performs a side effect (send email, call a service, ...).
    Action,
    /// Routes its input to a `true` or `false` output.
    Condition,
    /// Reshapes its input.
    Transformer,
    /// Posts its input to an external URL.
    Webhook,
}

impl NodeKind {
    /// All node kinds, in palette order.
    pub const ALL: [NodeKind; 5] = [
        Self::Trigger,
        Self::Action,
        Self::Condition,
        Self::Transformer,
        Self::Webhook,
    ];

    /// Returns the lowercase tag used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Condition => "condition",
            Self::Transformer => "transformer",
            Self::Webhook => "webhook",
        }
    }

    /// Returns the capitalised name used in generated labels.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Trigger => "Trigger",
            Self::Action => "Action",
            Self::Condition => "Condition",
            Self::Transformer => "Transformer",
            Self::Webhook => "Webhook",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the workflow.
    pub id: NodeId,
    /// The node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Human-readable label.
    pub label: String,
    /// Explicit ports. `None` means the ports come from the catalog entry
    /// for [`Node::kind`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<NodePorts>,
    /// Kind-specific parameters.
    #[serde(default)]
    pub params: Params,
}

impl Node {
    /// Creates a node whose ports are derived from its kind.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            ports: None,
            params: Params::new(),
        }
    }

    /// Replaces derived ports with an explicit port list.
    #[must_use]
    pub fn with_ports(mut self, ports: NodePorts) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Sets a single parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole parameter bag.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Returns true if the parameter is present and truthy.
    ///
    /// `null`, `false`, `0`, and `""` count as unset; arrays and objects
    /// count as set even when empty.
    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.params.get(key).is_some_and(is_truthy)
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: NodePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(params) = patch.params {
            self.params = params;
        }
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// An in-place update of a node's mutable fields.
///
/// Identity, kind, and ports are fixed at creation and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl NodePatch {
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            params: None,
        }
    }

    #[must_use]
    pub fn params(params: Params) -> Self {
        Self {
            label: None,
            params: Some(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_uses_lowercase_tag() {
        let json = serde_json::to_string(&NodeKind::Transformer).expect("serialize");
        assert_eq!(json, "\"transformer\"");
        assert_eq!(NodeKind::Webhook.display_name(), "Webhook");
    }

    #[test]
    fn new_node_derives_ports() {
        let node = Node::new("cond-1", NodeKind::Condition, "Check");
        assert!(node.ports.is_none());
        assert!(node.params.is_empty());
    }

    #[test]
    fn falsy_params_count_as_missing() {
        let node = Node::new("n", NodeKind::Webhook, "Hook")
            .with_param("empty", "")
            .with_param("zero", 0)
            .with_param("off", false)
            .with_param("nothing", JsonValue::Null)
            .with_param("list", json!([]))
            .with_param("url", "https://example.com");

        assert!(!node.has_param("empty"));
        assert!(!node.has_param("zero"));
        assert!(!node.has_param("off"));
        assert!(!node.has_param("nothing"));
        assert!(!node.has_param("absent"));
        assert!(node.has_param("list"));
        assert!(node.has_param("url"));
    }

    #[test]
    fn patch_updates_label_and_params() {
        let mut node = Node::new("n", NodeKind::Action, "Old").with_param("name", "x");
        node.apply(NodePatch::label("New"));
        assert_eq!(node.label, "New");
        assert!(node.has_param("name"));

        let mut params = Params::new();
        params.insert("name".into(), json!("Send Email"));
        node.apply(NodePatch::params(params));
        assert_eq!(node.params["name"], "Send Email");
        assert_eq!(node.label, "New");
    }

    #[test]
    fn node_wire_shape() {
        let json = r#"{
            "id": "trigger-1",
            "type": "trigger",
            "label": "Trigger 1",
            "ports": { "in": [], "out": [{ "id": "out", "dtype": "event" }] },
            "params": { "name": "Webhook Trigger" }
        }"#;
        let node: Node = serde_json::from_str(json).expect("deserialize");
        assert_eq!(node.id, "trigger-1");
        assert_eq!(node.kind, NodeKind::Trigger);
        let ports = node.ports.expect("explicit ports");
        assert!(ports.inputs.is_empty());
        assert_eq!(ports.outputs[0].id, "out");
    }

    #[test]
    fn derived_ports_are_not_serialized() {
        let node = Node::new("a", NodeKind::Action, "A");
        let value = serde_json::to_value(&node).expect("serialize");
        assert!(value.get("ports").is_none());
        assert_eq!(value["type"], "action");
    }
}
