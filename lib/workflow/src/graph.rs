//! Workflow graph container.
//!
//! Workflows are directed graphs where:
//! - Nodes are workflow steps with typed ports
//! - Edges connect output ports to input ports
//!
//! Nodes and edges are kept in editor display order. The container does not
//! enforce port-level integrity on its own: a graph loaded from storage may
//! carry edges whose endpoints no longer resolve, and the validators report
//! those rather than the container hiding them.

use crate::edge::{Edge, PortRef};
use crate::error::GraphError;
use crate::node::{Node, NodePatch};
use flowsmith_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// An ordered set of nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    /// Creates a new empty workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph from parts, rejecting repeated node or edge ids.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first repeated id.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.insert_edge(edge)?;
        }
        Ok(graph)
    }

    /// Checks that no node id or edge id appears more than once.
    ///
    /// # Errors
    ///
    /// Returns the duplicate as a [`GraphError`].
    pub fn check_unique_ids(&self) -> Result<(), GraphError> {
        let mut nodes = std::collections::HashSet::new();
        if let Some(node) = self.nodes.iter().find(|n| !nodes.insert(&n.id)) {
            return Err(GraphError::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
        let mut edges = std::collections::HashSet::new();
        if let Some(edge) = self.edges.iter().find(|e| !edges.insert(&e.id)) {
            return Err(GraphError::DuplicateEdge {
                edge_id: edge.id.clone(),
            });
        }
        Ok(())
    }

    /// Adds a node to the end of the display order.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.get_node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode { node_id: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node and every edge touching it.
    ///
    /// Returns the node and the removed edges.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<(Node, Vec<Edge>)> {
        let position = self.nodes.iter().position(|n| &n.id == node_id)?;
        let node = self.nodes.remove(position);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.touches(node_id));
        self.edges = kept;
        Some((node, removed))
    }

    /// Applies a label/params patch to a node in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn update_node(&mut self, node_id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        let node = self
            .get_node_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.clone(),
            })?;
        node.apply(patch);
        Ok(())
    }

    /// Returns a reference to a node by its ID.
    #[must_use]
    pub fn get_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == node_id)
    }

    /// Returns a mutable reference to a node by its ID.
    pub fn get_node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == node_id)
    }

    /// Appends an edge without checking its endpoints.
    ///
    /// Editors go through [`crate::WorkflowEditor::connect`], which runs the
    /// connection rules first. This is the raw insertion used when loading
    /// stored graphs.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge with the same id exists.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.get_edge(&edge.id).is_some() {
            return Err(GraphError::DuplicateEdge { edge_id: edge.id });
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes an edge by its ID.
    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> Option<Edge> {
        let position = self.edges.iter().position(|e| &e.id == edge_id)?;
        Some(self.edges.remove(position))
    }

    /// Returns a reference to an edge by its ID.
    #[must_use]
    pub fn get_edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == edge_id)
    }

    /// Returns true if an edge joins exactly these endpoints.
    #[must_use]
    pub fn has_edge_between(&self, from: &PortRef, to: &PortRef) -> bool {
        self.edges.iter().any(|e| e.joins(from, to))
    }

    /// Returns the number of edges feeding the given input port.
    #[must_use]
    pub fn incoming_count(&self, target: &PortRef) -> usize {
        self.edges.iter().filter(|e| &e.to == target).count()
    }

    /// Returns all nodes in display order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn edge(id: &str, from: (&str, &str), to: (&str, &str)) -> Edge {
        Edge::new(id, PortRef::new(from.0, from.1), PortRef::new(to.0, to.1))
    }

    fn three_nodes() -> WorkflowGraph {
        WorkflowGraph::from_parts(
            vec![
                Node::new("t", NodeKind::Trigger, "T"),
                Node::new("a", NodeKind::Action, "A"),
                Node::new("w", NodeKind::Webhook, "W"),
            ],
            vec![
                edge("e1", ("t", "out"), ("a", "in")),
                edge("e2", ("a", "out"), ("w", "in")),
            ],
        )
        .expect("valid graph")
    }

    #[test]
    fn add_and_get_node() {
        let mut graph = WorkflowGraph::new();
        graph
            .add_node(Node::new("n1", NodeKind::Action, "Test Action"))
            .expect("add");

        let retrieved = graph.get_node(&NodeId::from("n1"));
        assert_eq!(retrieved.map(|n| n.label.as_str()), Some("Test Action"));
    }

    #[test]
    fn add_node_rejects_duplicate_id() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(Node::new("n1", NodeKind::Action, "A")).expect("add");
        let err = graph
            .add_node(Node::new("n1", NodeKind::Webhook, "B"))
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateNode {
                node_id: NodeId::from("n1")
            }
        );
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut graph = three_nodes();
        let (node, removed) = graph.remove_node(&NodeId::from("a")).expect("removed");
        assert_eq!(node.id, "a");
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn remove_missing_node_is_none() {
        let mut graph = three_nodes();
        assert!(graph.remove_node(&NodeId::from("zzz")).is_none());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn update_node_in_place() {
        let mut graph = three_nodes();
        graph
            .update_node(&NodeId::from("a"), NodePatch::label("Send Email"))
            .expect("update");
        assert_eq!(graph.nodes()[1].label, "Send Email");

        let err = graph
            .update_node(&NodeId::from("zzz"), NodePatch::label("x"))
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { .. }));
    }

    #[test]
    fn incoming_count_per_port() {
        let graph = three_nodes();
        assert_eq!(graph.incoming_count(&PortRef::new("a", "in")), 1);
        assert_eq!(graph.incoming_count(&PortRef::new("t", "in")), 0);
        assert!(graph.has_edge_between(&PortRef::new("t", "out"), &PortRef::new("a", "in")));
    }

    #[test]
    fn check_unique_ids_after_deserialize() {
        let json = r#"{
            "nodes": [
                { "id": "x", "type": "action", "label": "A" },
                { "id": "x", "type": "action", "label": "B" }
            ],
            "edges": []
        }"#;
        let graph: WorkflowGraph = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(
            graph.check_unique_ids(),
            Err(GraphError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn graph_serde_roundtrip() {
        let graph = three_nodes();
        let json = serde_json::to_string(&graph).expect("serialize");
        let parsed: WorkflowGraph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, graph);
    }
}
