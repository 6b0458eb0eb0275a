//! Structural analysis of workflow graphs.
//!
//! Projects the resolvable part of a [`WorkflowGraph`] onto a petgraph
//! `DiGraph` and reports entry points, orphans, cycles, and an execution
//! order. Edges with an unknown endpoint node are left out; the validator
//! reports those separately.

use crate::graph::WorkflowGraph;
use flowsmith_core::NodeId;
use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Shape of a workflow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    /// Nodes with no incoming edges, in display order.
    pub entry_nodes: Vec<NodeId>,
    /// Nodes with no edges at all, a lone node included.
    pub orphaned_nodes: Vec<NodeId>,
    /// Nodes that sit on a cycle, in display order.
    pub cyclic_nodes: Vec<NodeId>,
    /// A topological order, or `None` if the graph has a cycle.
    pub execution_order: Option<Vec<NodeId>>,
}

impl StructureReport {
    /// Returns true if the graph has a cycle.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.execution_order.is_none()
    }
}

/// Analyses the structure of a graph.
#[must_use]
pub fn analyze_structure(graph: &WorkflowGraph) -> StructureReport {
    let mut dag: DiGraph<&NodeId, ()> =
        DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let mut index: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(graph.node_count());
    for node in graph.nodes() {
        index
            .entry(&node.id)
            .or_insert_with(|| dag.add_node(&node.id));
    }
    for edge in graph.edges() {
        if let (Some(&from), Some(&to)) = (index.get(&edge.from.node), index.get(&edge.to.node)) {
            dag.add_edge(from, to, ());
        }
    }

    let has_edges = |idx: NodeIndex, direction: Direction| {
        dag.neighbors_directed(idx, direction).next().is_some()
    };

    let entry_nodes: Vec<NodeId> = dag
        .node_indices()
        .filter(|&idx| !has_edges(idx, Direction::Incoming))
        .map(|idx| dag[idx].clone())
        .collect();

    let orphaned_nodes: Vec<NodeId> = dag
        .node_indices()
        .filter(|&idx| {
            !has_edges(idx, Direction::Incoming) && !has_edges(idx, Direction::Outgoing)
        })
        .map(|idx| dag[idx].clone())
        .collect();

    let mut on_cycle: Vec<NodeIndex> = tarjan_scc(&dag)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&idx| dag.contains_edge(idx, idx)))
        .flatten()
        .collect();
    on_cycle.sort_unstable();
    let cyclic_nodes: Vec<NodeId> = on_cycle.into_iter().map(|idx| dag[idx].clone()).collect();

    let execution_order = toposort(&dag, None)
        .ok()
        .map(|order| order.into_iter().map(|idx| dag[idx].clone()).collect());

    debug!(
        entries = entry_nodes.len(),
        orphans = orphaned_nodes.len(),
        cyclic = cyclic_nodes.len(),
        "graph structure analysed"
    );

    StructureReport {
        entry_nodes,
        orphaned_nodes,
        cyclic_nodes,
        execution_order,
    }
}
