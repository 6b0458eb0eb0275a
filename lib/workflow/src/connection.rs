//! Connection rules.
//!
//! Decides whether a candidate edge may be added to a graph. The rules run
//! in a fixed order and stop at the first failure:
//!
//! 1. no self-loop
//! 2. both nodes exist
//! 3. the source port is an output of the source node and the target port is
//!    an input of the target node
//! 4. no identical edge exists
//! 5. a single-producer input is not already fed
//! 6. the target type accepts the source type
//!
//! A rejected connection is a normal outcome, never an error: the editor
//! calls this on every drag frame and must not fail on a bad target.

use crate::catalog::NodeCatalog;
use crate::edge::{Connection, PortRef};
use crate::graph::WorkflowGraph;
use crate::port::DataType;
use flowsmith_core::NodeId;
use std::fmt;
use tracing::debug;

/// The rule a candidate connection failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRejection {
    /// Source and target are the same node.
    SelfLoop { node_id: NodeId },
    /// A referenced node does not exist.
    UnknownNode { node_id: NodeId },
    /// The source node has no output port with this id.
    UnknownSourcePort { node_id: NodeId, port: String },
    /// The target node has no input port with this id.
    UnknownTargetPort { node_id: NodeId, port: String },
    /// An identical edge already exists.
    Duplicate,
    /// The target input takes one producer and already has it.
    TargetPortOccupied { node_id: NodeId, port: String },
    /// The target port does not accept the source port's type.
    TypeMismatch { source: DataType, target: DataType },
}

impl ConnectionRejection {
    /// A short stable name for the failed rule.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SelfLoop { .. } => "self_loop",
            Self::UnknownNode { .. } => "unknown_node",
            Self::UnknownSourcePort { .. } => "unknown_source_port",
            Self::UnknownTargetPort { .. } => "unknown_target_port",
            Self::Duplicate => "duplicate",
            Self::TargetPortOccupied { .. } => "target_port_occupied",
            Self::TypeMismatch { .. } => "type_mismatch",
        }
    }
}

impl fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node_id } => write!(f, "node {node_id} cannot connect to itself"),
            Self::UnknownNode { node_id } => write!(f, "node not found: {node_id}"),
            Self::UnknownSourcePort { node_id, port } => {
                write!(f, "source port '{port}' not found on node {node_id}")
            }
            Self::UnknownTargetPort { node_id, port } => {
                write!(f, "target port '{port}' not found on node {node_id}")
            }
            Self::Duplicate => write!(f, "an identical edge already exists"),
            Self::TargetPortOccupied { node_id, port } => {
                write!(f, "input '{port}' on node {node_id} already has a producer")
            }
            Self::TypeMismatch { source, target } => {
                write!(f, "type {source} cannot feed an input of type {target}")
            }
        }
    }
}

impl std::error::Error for ConnectionRejection {}

/// Applies the connection rules against a node catalog.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionValidator<'a> {
    catalog: &'a NodeCatalog,
}

impl<'a> ConnectionValidator<'a> {
    #[must_use]
    pub fn new(catalog: &'a NodeCatalog) -> Self {
        Self { catalog }
    }

    /// Runs the rules and reports the first one that fails.
    ///
    /// # Errors
    ///
    /// Returns the failed rule. A rejection is an expected outcome.
    pub fn check(
        &self,
        candidate: &Connection,
        graph: &WorkflowGraph,
    ) -> Result<(), ConnectionRejection> {
        let result = self.evaluate(candidate, graph);
        if let Err(rejection) = &result {
            debug!(
                source = %candidate.source,
                target = %candidate.target,
                rule = rejection.code(),
                "connection rejected"
            );
        }
        result
    }

    /// Returns true if the candidate passes every rule.
    #[must_use]
    pub fn is_valid(&self, candidate: &Connection, graph: &WorkflowGraph) -> bool {
        self.evaluate(candidate, graph).is_ok()
    }

    /// Lists every input port the given output could connect to right now.
    ///
    /// Used to highlight drop targets while a drag is in progress.
    #[must_use]
    pub fn targets_for(&self, source: &PortRef, graph: &WorkflowGraph) -> Vec<PortRef> {
        graph
            .nodes()
            .iter()
            .flat_map(|node| {
                self.catalog
                    .ports_of(node)
                    .inputs
                    .iter()
                    .map(move |port| PortRef::new(node.id.clone(), port.id.clone()))
            })
            .filter(|target| {
                let candidate = Connection::new(
                    source.node.clone(),
                    source.port.clone(),
                    target.node.clone(),
                    target.port.clone(),
                );
                self.is_valid(&candidate, graph)
            })
            .collect()
    }

    fn evaluate(
        &self,
        candidate: &Connection,
        graph: &WorkflowGraph,
    ) -> Result<(), ConnectionRejection> {
        let (from, to) =
            candidate.endpoints(self.catalog.default_output(), self.catalog.default_input());

        if from.node == to.node {
            return Err(ConnectionRejection::SelfLoop { node_id: from.node });
        }

        let source = graph
            .get_node(&from.node)
            .ok_or_else(|| ConnectionRejection::UnknownNode {
                node_id: from.node.clone(),
            })?;
        let target = graph
            .get_node(&to.node)
            .ok_or_else(|| ConnectionRejection::UnknownNode {
                node_id: to.node.clone(),
            })?;

        let source_port = self
            .catalog
            .ports_of(source)
            .output(&from.port)
            .ok_or_else(|| ConnectionRejection::UnknownSourcePort {
                node_id: from.node.clone(),
                port: from.port.clone(),
            })?;
        let target_port = self
            .catalog
            .ports_of(target)
            .input(&to.port)
            .ok_or_else(|| ConnectionRejection::UnknownTargetPort {
                node_id: to.node.clone(),
                port: to.port.clone(),
            })?;

        if graph.has_edge_between(&from, &to) {
            return Err(ConnectionRejection::Duplicate);
        }

        if !target_port.multi && graph.incoming_count(&to) > 0 {
            return Err(ConnectionRejection::TargetPortOccupied {
                node_id: to.node,
                port: to.port,
            });
        }

        if !target_port.accepts(source_port) {
            return Err(ConnectionRejection::TypeMismatch {
                source: source_port.dtype,
                target: target_port.dtype,
            });
        }

        Ok(())
    }
}

/// Returns true if the candidate may be added, using the builtin catalog.
#[must_use]
pub fn is_valid_connection(candidate: &Connection, graph: &WorkflowGraph) -> bool {
    ConnectionValidator::new(NodeCatalog::builtin()).is_valid(candidate, graph)
}

/// Reports which rule the candidate fails, using the builtin catalog.
///
/// # Errors
///
/// Returns the failed rule.
pub fn check_connection(
    candidate: &Connection,
    graph: &WorkflowGraph,
) -> Result<(), ConnectionRejection> {
    ConnectionValidator::new(NodeCatalog::builtin()).check(candidate, graph)
}
