//! Error types for the workflow crate.
//!
//! Rejected connections and graph issues are ordinary return values, not
//! errors. The types here cover genuinely failed operations:
//! - `GraphError`: low-level graph mutations (unknown or duplicate ids)
//! - `CatalogError`: invalid host overrides for the node catalog
//! - `EditorError`: editor session operations, reported through rootcause

use crate::connection::ConnectionRejection;
use crate::node::NodeKind;
use flowsmith_core::{EdgeId, NodeId};
use std::fmt;

/// Errors from graph mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this ID already exists.
    DuplicateNode { node_id: NodeId },
    /// An edge with this ID already exists.
    DuplicateEdge { edge_id: EdgeId },
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// Edge with the given ID was not found in the graph.
    EdgeNotFound { edge_id: EdgeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { node_id } => write!(f, "duplicate node id: {node_id}"),
            Self::DuplicateEdge { edge_id } => write!(f, "duplicate edge id: {edge_id}"),
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::EdgeNotFound { edge_id } => write!(f, "edge not found: {edge_id}"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors from building a node catalog out of host overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A default handle id is empty or whitespace.
    BlankDefaultHandle,
    /// An overridden port list repeats an id in the same direction.
    DuplicatePort { kind: NodeKind, port: String },
    /// A required parameter name is empty or whitespace.
    BlankParam { kind: NodeKind },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankDefaultHandle => write!(f, "default handle ids must not be blank"),
            Self::DuplicatePort { kind, port } => {
                write!(f, "{kind} declares port '{port}' twice")
            }
            Self::BlankParam { kind } => {
                write!(f, "{kind} declares a blank required parameter name")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Errors from editor session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// A graph mutation failed.
    Graph(GraphError),
    /// The candidate connection failed a validation rule.
    ConnectionRejected(ConnectionRejection),
    /// The graph holds dangling edge references or repeated node ids and
    /// cannot be saved.
    SaveBlocked { blocking: usize },
    /// The workflow could not be converted to or from JSON.
    Serialization { details: String },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(err) => write!(f, "graph update failed: {err}"),
            Self::ConnectionRejected(reason) => write!(f, "connection rejected: {reason}"),
            Self::SaveBlocked { blocking } => {
                write!(
                    f,
                    "workflow has {blocking} integrity issue(s) and cannot be saved"
                )
            }
            Self::Serialization { details } => {
                write!(f, "workflow serialization failed: {details}")
            }
        }
    }
}

impl std::error::Error for EditorError {}

impl From<GraphError> for EditorError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}
