//! Whole-graph diagnostics.
//!
//! [`GraphValidator`] walks a graph snapshot and produces one ordered issue
//! list per node, feeding the editor's diagnostics overlay. Checks run in
//! three passes and each node's list follows pass order:
//! 1. required inputs without an incoming edge
//! 2. edges, in edge order: type mismatches and dangling references
//! 3. required parameters that are absent or falsy
//!
//! Problems are returned, never raised. An edge whose endpoints do not
//! resolve is reported as a dangling reference on whichever end does
//! resolve, or on the graph as a whole when neither node exists. A node
//! that repeats an earlier node's id is reported on the graph as a whole
//! and otherwise left out; the first node with that id keeps the entry.

use crate::catalog::NodeCatalog;
use crate::edge::{Edge, PortRef};
use crate::graph::WorkflowGraph;
use crate::node::Node;
use crate::port::DataType;
use flowsmith_core::{EdgeId, NodeId};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Which end of an edge a dangling reference sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// A single diagnostic.
///
/// The `Display` form is the message shown to users and the form used when
/// issues are serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A required input port has no incoming edge.
    MissingInput { port: String },
    /// An edge joins ports whose types are incompatible.
    TypeMismatch {
        source: DataType,
        target: DataType,
        port: String,
    },
    /// A required parameter is absent or falsy.
    MissingParam { name: String },
    /// An edge names a node that does not exist.
    DanglingNode {
        edge_id: EdgeId,
        end: Endpoint,
        node_id: NodeId,
    },
    /// An edge names a port that does not exist on its node.
    DanglingPort {
        edge_id: EdgeId,
        end: Endpoint,
        node_id: NodeId,
        port: String,
    },
    /// A node repeats the id of an earlier node.
    DuplicateNode { node_id: NodeId },
}

impl Issue {
    /// Returns true for dangling edge references.
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::DanglingNode { .. } | Self::DanglingPort { .. })
    }

    /// Returns true for issues that break graph integrity: dangling edge
    /// references and repeated node ids.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.is_dangling() || matches!(self, Self::DuplicateNode { .. })
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput { port } => write!(f, "Missing required input: {port}"),
            Self::TypeMismatch {
                source,
                target,
                port,
            } => write!(f, "Type mismatch: {source} → {target} on port {port}"),
            Self::MissingParam { name } => write!(f, "Missing required parameter: {name}"),
            Self::DanglingNode {
                edge_id,
                end,
                node_id,
            } => write!(f, "Dangling edge {edge_id}: {end} node {node_id} not found"),
            Self::DanglingPort {
                edge_id,
                end,
                node_id,
                port,
            } => write!(
                f,
                "Dangling edge {edge_id}: {end} port {port} not found on node {node_id}"
            ),
            Self::DuplicateNode { node_id } => write!(f, "Duplicate node id: {node_id}"),
        }
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The result of validating a graph.
///
/// Every node in the graph has an entry, in node display order, even when
/// its list is empty. Serialises as
/// `{"nodes": {"<id>": ["<issue>", ...], ...}, "graph": [...]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationIssues {
    nodes: Vec<(NodeId, Vec<Issue>)>,
    index: HashMap<NodeId, usize>,
    graph: Vec<Issue>,
}

impl ValidationIssues {
    fn with_nodes<'a>(ids: impl Iterator<Item = &'a NodeId>) -> Self {
        let mut issues = Self::default();
        for id in ids {
            if issues.index.contains_key(id) {
                issues.graph.push(Issue::DuplicateNode {
                    node_id: id.clone(),
                });
            } else {
                issues.index.insert(id.clone(), issues.nodes.len());
                issues.nodes.push((id.clone(), Vec::new()));
            }
        }
        issues
    }

    fn push(&mut self, node_id: &NodeId, issue: Issue) {
        match self.index.get(node_id) {
            Some(&slot) => self.nodes[slot].1.push(issue),
            None => self.graph.push(issue),
        }
    }

    /// Returns the issues for a node, or `None` if the node was not in the
    /// validated graph.
    #[must_use]
    pub fn get(&self, node_id: &NodeId) -> Option<&[Issue]> {
        self.index
            .get(node_id)
            .map(|&slot| self.nodes[slot].1.as_slice())
    }

    /// Returns the issue messages for a node.
    #[must_use]
    pub fn messages(&self, node_id: &NodeId) -> Vec<String> {
        self.get(node_id)
            .map(|issues| issues.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Iterates over every node entry in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &[Issue])> {
        self.nodes.iter().map(|(id, issues)| (id, issues.as_slice()))
    }

    /// Issues that could not be attached to any node.
    #[must_use]
    pub fn graph_issues(&self) -> &[Issue] {
        &self.graph
    }

    /// Returns the number of node entries.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of issues.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.all().count()
    }

    /// Returns the number of dangling edge references.
    #[must_use]
    pub fn dangling_count(&self) -> usize {
        self.all().filter(|issue| issue.is_dangling()).count()
    }

    /// Returns true if no issue was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.all().next().is_none()
    }

    /// Returns the number of issues that block a save.
    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.all().filter(|issue| issue.is_blocking()).count()
    }

    /// Returns true if the graph must not be saved as is.
    ///
    /// Only dangling references and repeated node ids block a save; every
    /// other issue is a warning.
    #[must_use]
    pub fn blocks_save(&self) -> bool {
        self.all().any(Issue::is_blocking)
    }

    fn all(&self) -> impl Iterator<Item = &Issue> {
        self.nodes
            .iter()
            .flat_map(|(_, issues)| issues)
            .chain(&self.graph)
    }
}

struct NodeEntries<'a>(&'a [(NodeId, Vec<Issue>)]);

impl Serialize for NodeEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, issues) in self.0 {
            map.serialize_entry(id, issues)?;
        }
        map.end()
    }
}

impl Serialize for ValidationIssues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationIssues", 2)?;
        state.serialize_field("nodes", &NodeEntries(&self.nodes))?;
        state.serialize_field("graph", &self.graph)?;
        state.end()
    }
}

/// Validates whole graphs against a node catalog.
#[derive(Debug, Clone, Copy)]
pub struct GraphValidator<'a> {
    catalog: &'a NodeCatalog,
}

impl<'a> GraphValidator<'a> {
    #[must_use]
    pub fn new(catalog: &'a NodeCatalog) -> Self {
        Self { catalog }
    }

    /// Produces the issue lists for every node of the graph.
    ///
    /// Runs in time linear in the number of nodes, edges, ports and
    /// required parameters. The output depends only on the graph and the
    /// catalog, so repeated calls return equal results.
    #[must_use]
    pub fn validate(&self, graph: &WorkflowGraph) -> ValidationIssues {
        let nodes: HashMap<&NodeId, &Node> = graph
            .nodes()
            .iter()
            .rev()
            .map(|node| (&node.id, node))
            .collect();
        let fed: HashSet<&PortRef> = graph.edges().iter().map(|edge| &edge.to).collect();
        let mut issues = ValidationIssues::with_nodes(graph.nodes().iter().map(|n| &n.id));
        // Nodes that repeat an earlier id get no checks of their own.
        let owned: Vec<&Node> = graph
            .nodes()
            .iter()
            .filter(|node| {
                nodes
                    .get(&node.id)
                    .is_some_and(|first| std::ptr::eq(*first, *node))
            })
            .collect();

        for node in &owned {
            for port in &self.catalog.ports_of(node).inputs {
                let target = PortRef::new(node.id.clone(), port.id.clone());
                if port.required && !fed.contains(&target) {
                    issues.push(
                        &node.id,
                        Issue::MissingInput {
                            port: port.id.clone(),
                        },
                    );
                }
            }
        }

        for edge in graph.edges() {
            self.check_edge(edge, &nodes, &mut issues);
        }

        for node in &owned {
            for name in self.catalog.required_params(node.kind) {
                if !node.has_param(name) {
                    issues.push(&node.id, Issue::MissingParam { name: name.clone() });
                }
            }
        }

        debug!(
            nodes = issues.node_count(),
            issues = issues.issue_count(),
            dangling = issues.dangling_count(),
            blocking = issues.blocking_count(),
            "graph validated"
        );
        issues
    }

    fn check_edge(
        &self,
        edge: &Edge,
        nodes: &HashMap<&NodeId, &Node>,
        issues: &mut ValidationIssues,
    ) {
        let source = nodes.get(&edge.from.node).copied();
        let target = nodes.get(&edge.to.node).copied();

        let dangling_node = |end: Endpoint, port: &PortRef| Issue::DanglingNode {
            edge_id: edge.id.clone(),
            end,
            node_id: port.node.clone(),
        };
        let dangling_port = |end: Endpoint, port: &PortRef| Issue::DanglingPort {
            edge_id: edge.id.clone(),
            end,
            node_id: port.node.clone(),
            port: port.port.clone(),
        };

        let (source, target) = match (source, target) {
            (Some(source), Some(target)) => (source, target),
            (None, Some(_)) => {
                issues.push(&edge.to.node, dangling_node(Endpoint::Source, &edge.from));
                return;
            }
            (Some(_), None) => {
                issues.push(&edge.from.node, dangling_node(Endpoint::Target, &edge.to));
                return;
            }
            (None, None) => {
                issues.graph.push(dangling_node(Endpoint::Source, &edge.from));
                issues.graph.push(dangling_node(Endpoint::Target, &edge.to));
                return;
            }
        };

        let source_port = self.catalog.ports_of(source).output(&edge.from.port);
        let target_port = self.catalog.ports_of(target).input(&edge.to.port);

        match (source_port, target_port) {
            (Some(source_port), Some(target_port)) => {
                if !target_port.accepts(source_port) {
                    issues.push(
                        &target.id,
                        Issue::TypeMismatch {
                            source: source_port.dtype,
                            target: target_port.dtype,
                            port: target_port.id.clone(),
                        },
                    );
                }
            }
            (source_port, target_port) => {
                if source_port.is_none() {
                    issues.push(&source.id, dangling_port(Endpoint::Source, &edge.from));
                }
                if target_port.is_none() {
                    issues.push(&target.id, dangling_port(Endpoint::Target, &edge.to));
                }
            }
        }
    }
}

/// Validates a graph against the builtin catalog.
#[must_use]
pub fn validate_graph(graph: &WorkflowGraph) -> ValidationIssues {
    GraphValidator::new(NodeCatalog::builtin()).validate(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::port::{InputPort, NodePorts, OutputPort};
    use serde_json::json;

    fn trigger_1() -> Node {
        Node::new("trigger-1", NodeKind::Trigger, "Trigger 1")
            .with_param("name", "Webhook Trigger")
            .with_ports(NodePorts::new(
                vec![],
                vec![OutputPort::new("out", DataType::Event)],
            ))
    }

    fn action_1() -> Node {
        Node::new("action-1", NodeKind::Action, "Action 1")
            .with_param("name", "Send Email")
            .with_ports(NodePorts::new(
                vec![InputPort::required("in", DataType::Event)],
                vec![OutputPort::new("out", DataType::Json)],
            ))
    }

    fn edge(id: &str, from: (&str, &str), to: (&str, &str)) -> Edge {
        Edge::new(id, PortRef::new(from.0, from.1), PortRef::new(to.0, to.1))
    }

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    #[test]
    fn every_node_has_an_entry() {
        let graph = WorkflowGraph::from_parts(vec![trigger_1(), action_1()], vec![]).unwrap();
        let issues = validate_graph(&graph);
        let order: Vec<_> = issues.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["trigger-1", "action-1"]);
        assert_eq!(issues.get(&id("trigger-1")), Some(&[][..]));
        assert_eq!(issues.get(&id("nope")), None);
    }

    #[test]
    fn empty_graph_is_clean() {
        let issues = validate_graph(&WorkflowGraph::new());
        assert!(issues.is_clean());
        assert_eq!(issues.node_count(), 0);
    }

    #[test]
    fn missing_input_clears_once_fed() {
        let mut graph =
            WorkflowGraph::from_parts(vec![trigger_1(), action_1()], vec![]).unwrap();
        assert_eq!(
            validate_graph(&graph).messages(&id("action-1")),
            ["Missing required input: in"]
        );

        graph
            .insert_edge(edge("e1", ("trigger-1", "out"), ("action-1", "in")))
            .unwrap();
        let issues = validate_graph(&graph);
        assert!(issues.is_clean());
    }

    #[test]
    fn mismatch_lands_on_target_node() {
        let text = Node::new("text-1", NodeKind::Transformer, "Text")
            .with_param("transformation", "x => x")
            .with_ports(NodePorts::new(
                vec![],
                vec![OutputPort::new("out", DataType::Text)],
            ));
        let json_in = Node::new("action-2", NodeKind::Action, "Action 2")
            .with_param("name", "Store")
            .with_ports(NodePorts::new(
                vec![InputPort::required("in", DataType::Json)],
                vec![],
            ));
        let graph = WorkflowGraph::from_parts(
            vec![text, json_in],
            vec![edge("e1", ("text-1", "out"), ("action-2", "in"))],
        )
        .unwrap();

        let issues = validate_graph(&graph);
        assert_eq!(
            issues.messages(&id("action-2")),
            ["Type mismatch: text → json on port in"]
        );
        assert!(issues.messages(&id("text-1")).is_empty());
        assert!(!issues.blocks_save());
    }

    #[test]
    fn issue_order_follows_passes() {
        // Derived action ports: required `in: any`.
        let bare = Node::new("a", NodeKind::Action, "A").with_param("name", "");
        let graph = WorkflowGraph::from_parts(vec![bare], vec![]).unwrap();
        assert_eq!(
            validate_graph(&graph).messages(&id("a")),
            [
                "Missing required input: in",
                "Missing required parameter: name"
            ]
        );
    }

    #[test]
    fn params_are_checked_even_when_bag_is_empty() {
        let graph = WorkflowGraph::from_parts(
            vec![
                Node::new("c", NodeKind::Condition, "If"),
                Node::new("w", NodeKind::Webhook, "Hook").with_param("url", json!(0)),
            ],
            vec![],
        )
        .unwrap();
        let issues = validate_graph(&graph);
        assert!(issues
            .messages(&id("c"))
            .contains(&"Missing required parameter: condition".to_string()));
        assert!(issues
            .messages(&id("w"))
            .contains(&"Missing required parameter: url".to_string()));
    }

    #[test]
    fn dangling_source_node_reported_on_target() {
        let graph = WorkflowGraph::from_parts(
            vec![action_1()],
            vec![edge("e9", ("ghost", "out"), ("action-1", "in"))],
        )
        .unwrap();
        let issues = validate_graph(&graph);
        assert_eq!(
            issues.messages(&id("action-1")),
            ["Dangling edge e9: source node ghost not found"]
        );
        assert!(issues.blocks_save());
        assert_eq!(issues.dangling_count(), 1);
    }

    #[test]
    fn dangling_port_reported_on_owner() {
        let graph = WorkflowGraph::from_parts(
            vec![trigger_1(), action_1()],
            vec![edge("e1", ("trigger-1", "gone"), ("action-1", "in"))],
        )
        .unwrap();
        let issues = validate_graph(&graph);
        assert_eq!(
            issues.messages(&id("trigger-1")),
            ["Dangling edge e1: source port gone not found on node trigger-1"]
        );
        // The edge still feeds the input, so no missing-input issue.
        assert!(issues.messages(&id("action-1")).is_empty());
    }

    #[test]
    fn fully_dangling_edge_goes_to_graph() {
        let graph = WorkflowGraph::from_parts(
            vec![trigger_1()],
            vec![edge("e1", ("x", "out"), ("y", "in"))],
        )
        .unwrap();
        let issues = validate_graph(&graph);
        let graph_level: Vec<_> = issues.graph_issues().iter().map(ToString::to_string).collect();
        assert_eq!(
            graph_level,
            [
                "Dangling edge e1: source node x not found",
                "Dangling edge e1: target node y not found"
            ]
        );
        assert!(issues.messages(&id("trigger-1")).is_empty());
        assert!(issues.blocks_save());
    }

    #[test]
    fn validation_is_idempotent() {
        let graph = WorkflowGraph::from_parts(
            vec![trigger_1(), action_1(), Node::new("c", NodeKind::Condition, "C")],
            vec![
                edge("e1", ("trigger-1", "out"), ("c", "in")),
                edge("e2", ("c", "maybe"), ("action-1", "in")),
            ],
        )
        .unwrap();
        let first = validate_graph(&graph);
        let second = validate_graph(&graph);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn repeated_node_id_is_reported_not_merged() {
        let graph: WorkflowGraph = serde_json::from_value(json!({
            "nodes": [
                { "id": "x", "type": "action", "label": "First", "params": { "name": "ok" } },
                { "id": "x", "type": "webhook", "label": "Second" }
            ],
            "edges": []
        }))
        .unwrap();
        let issues = validate_graph(&graph);

        assert_eq!(issues.node_count(), 1);
        assert_eq!(issues.messages(&id("x")), ["Missing required input: in"]);
        let graph_level: Vec<_> = issues.graph_issues().iter().map(ToString::to_string).collect();
        assert_eq!(graph_level, ["Duplicate node id: x"]);
        assert!(issues.blocks_save());
        assert_eq!(issues.blocking_count(), 1);
        assert_eq!(issues.dangling_count(), 0);
    }

    #[test]
    fn serializes_in_display_order() {
        let graph = WorkflowGraph::from_parts(vec![trigger_1(), action_1()], vec![]).unwrap();
        let value = serde_json::to_value(validate_graph(&graph)).unwrap();
        assert_eq!(
            value,
            json!({
                "nodes": {
                    "trigger-1": [],
                    "action-1": ["Missing required input: in"]
                },
                "graph": []
            })
        );
    }
}
