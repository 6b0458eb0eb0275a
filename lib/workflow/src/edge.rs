//! Edge types for workflow graphs.
//!
//! An [`Edge`] is a committed connection stored in the graph. A
//! [`Connection`] is a candidate the editor wants to add; its handles may be
//! omitted, in which case the catalog's default port ids apply.

use flowsmith_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// One end of an edge: a node and one of its ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: String,
}

impl PortRef {
    #[must_use]
    pub fn new(node: impl Into<NodeId>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

/// A directed edge from a source output port to a target input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge within the graph.
    pub id: EdgeId,
    /// The producing end (an output port).
    pub from: PortRef,
    /// The consuming end (an input port).
    pub to: PortRef,
}

impl Edge {
    /// Creates a new edge between ports.
    #[must_use]
    pub fn new(id: impl Into<EdgeId>, from: PortRef, to: PortRef) -> Self {
        Self {
            id: id.into(),
            from,
            to,
        }
    }

    /// Returns true if this edge touches the given node at either end.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.from.node == node_id || &self.to.node == node_id
    }

    /// Returns true if this edge joins exactly the given endpoints.
    #[must_use]
    pub fn joins(&self, from: &PortRef, to: &PortRef) -> bool {
        &self.from == from && &self.to == to
    }
}

/// A candidate connection proposed by the editor.
///
/// Field names follow the drag-and-drop layer (`source`, `sourceHandle`,
/// `target`, `targetHandle`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    #[serde(default, alias = "source_handle", skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub target: NodeId,
    #[serde(default, alias = "target_handle", skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Creates a candidate with explicit handles.
    #[must_use]
    pub fn new(
        source: impl Into<NodeId>,
        source_handle: impl Into<String>,
        target: impl Into<NodeId>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: Some(source_handle.into()),
            target: target.into(),
            target_handle: Some(target_handle.into()),
        }
    }

    /// Creates a candidate that uses the default handles on both ends.
    #[must_use]
    pub fn between(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            source_handle: None,
            target: target.into(),
            target_handle: None,
        }
    }

    /// Resolves both ends, filling omitted handles with the given defaults.
    #[must_use]
    pub fn endpoints(&self, default_output: &str, default_input: &str) -> (PortRef, PortRef) {
        (
            PortRef::new(
                self.source.clone(),
                self.source_handle.as_deref().unwrap_or(default_output),
            ),
            PortRef::new(
                self.target.clone(),
                self.target_handle.as_deref().unwrap_or(default_input),
            ),
        )
    }
}

impl From<&Edge> for Connection {
    fn from(edge: &Edge) -> Self {
        Self::new(
            edge.from.node.clone(),
            edge.from.port.clone(),
            edge.to.node.clone(),
            edge.to.port.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_wire_shape() {
        let json = r#"{
            "id": "edge-1",
            "from": { "node": "trigger-1", "port": "out" },
            "to": { "node": "action-1", "port": "in" }
        }"#;
        let edge: Edge = serde_json::from_str(json).expect("deserialize");
        assert_eq!(edge.from, PortRef::new("trigger-1", "out"));
        assert_eq!(edge.to, PortRef::new("action-1", "in"));
    }

    #[test]
    fn touches_either_end() {
        let edge = Edge::new(
            "e",
            PortRef::new("a", "out"),
            PortRef::new("b", "in"),
        );
        assert!(edge.touches(&NodeId::from("a")));
        assert!(edge.touches(&NodeId::from("b")));
        assert!(!edge.touches(&NodeId::from("c")));
    }

    #[test]
    fn connection_accepts_camel_and_snake_case() {
        let camel: Connection = serde_json::from_str(
            r#"{"source":"a","sourceHandle":"out","target":"b","targetHandle":"in"}"#,
        )
        .expect("camelCase");
        let snake: Connection = serde_json::from_str(
            r#"{"source":"a","source_handle":"out","target":"b","target_handle":"in"}"#,
        )
        .expect("snake_case");
        assert_eq!(camel, snake);
        assert_eq!(camel, Connection::new("a", "out", "b", "in"));
    }

    #[test]
    fn omitted_handles_take_defaults() {
        let conn = Connection::between("a", "b");
        let (from, to) = conn.endpoints("out", "in");
        assert_eq!(from, PortRef::new("a", "out"));
        assert_eq!(to, PortRef::new("b", "in"));

        let conn = Connection::new("a", "true", "b", "in");
        let (from, _) = conn.endpoints("out", "in");
        assert_eq!(from.port, "true");
    }
}
