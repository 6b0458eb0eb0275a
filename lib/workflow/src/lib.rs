//! Workflow graph model and validation for flowsmith.
//!
//! This crate provides the editing core behind the workflow canvas:
//!
//! - **Graph Model**: typed nodes (trigger, action, condition, transformer,
//!   webhook) joined by edges between named ports
//! - **Catalog**: per-kind canonical ports and required parameters
//! - **Connection Rules**: the drag-time check deciding whether an edge may
//!   be added
//! - **Graph Validation**: per-node diagnostics for the whole graph
//! - **Structure**: entry points, orphans, cycles and execution order
//! - **Editor**: a session that keeps the graph and its diagnostics in step

pub mod catalog;
pub mod connection;
pub mod definition;
pub mod edge;
pub mod editor;
pub mod error;
pub mod graph;
pub mod node;
pub mod port;
pub mod structure;
pub mod validate;

pub use catalog::{CatalogConfig, KindOverride, KindSchema, NodeCatalog};
pub use connection::{
    ConnectionRejection, ConnectionValidator, check_connection, is_valid_connection,
};
pub use definition::{Workflow, WorkflowMetadata};
pub use edge::{Connection, Edge, PortRef};
pub use editor::WorkflowEditor;
pub use error::{CatalogError, EditorError, GraphError};
pub use graph::WorkflowGraph;
pub use node::{Node, NodeKind, NodePatch, Params};
pub use port::{DataType, InputPort, NodePorts, OutputPort};
pub use structure::{StructureReport, analyze_structure};
pub use validate::{Endpoint, GraphValidator, Issue, ValidationIssues, validate_graph};
