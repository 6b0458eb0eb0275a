//! Workflow definition types.
//!
//! A workflow is an identified graph with optional descriptive metadata. On
//! the wire the graph's `nodes` and `edges` sit at the top level next to the
//! id, so a bare `{"nodes": [...], "edges": [...]}` document also loads.

use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeKind};
use crate::port::{DataType, InputPort, NodePorts, OutputPort};
use flowsmith_core::WorkflowId;
use serde::{Deserialize, Serialize};

/// Descriptive metadata for a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Human-readable name for this workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description of what this workflow does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A complete workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow. Generated when absent.
    #[serde(default = "WorkflowId::generate")]
    pub id: WorkflowId,
    /// Workflow metadata.
    #[serde(flatten)]
    pub metadata: WorkflowMetadata,
    /// The workflow graph (nodes and edges).
    #[serde(flatten)]
    pub graph: WorkflowGraph,
}

impl Workflow {
    /// Creates an empty workflow with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_graph(WorkflowGraph::new())
    }

    /// Wraps an existing graph in a workflow with a fresh id.
    #[must_use]
    pub fn with_graph(graph: WorkflowGraph) -> Self {
        Self {
            id: WorkflowId::generate(),
            metadata: WorkflowMetadata::default(),
            graph,
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    /// Returns the workflow name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// The starter workflow a new editor session opens with: a webhook
    /// trigger and an unconnected email action.
    #[must_use]
    pub fn seeded() -> Self {
        let trigger = Node::new("trigger-1", NodeKind::Trigger, "Trigger 1")
            .with_param("name", "Webhook Trigger")
            .with_ports(NodePorts::new(
                vec![],
                vec![OutputPort::new("out", DataType::Event)],
            ));
        let action = Node::new("action-1", NodeKind::Action, "Action 1")
            .with_param("name", "Send Email")
            .with_ports(NodePorts::new(
                vec![InputPort::required("in", DataType::Event)],
                vec![OutputPort::new("out", DataType::Json)],
            ));

        let mut graph = WorkflowGraph::new();
        for node in [trigger, action] {
            let added = graph.add_node(node);
            debug_assert!(added.is_ok(), "seed node ids are distinct");
        }
        Self::with_graph(graph)
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}
