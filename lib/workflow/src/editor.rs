//! Editor session.
//!
//! [`WorkflowEditor`] owns the workflow being edited and the diagnostics for
//! its current state. Every mutation goes through the editor, which runs the
//! connection rules before inserting an edge and revalidates the whole graph
//! afterwards, so [`WorkflowEditor::issues`] always matches the graph.

use crate::catalog::NodeCatalog;
use crate::connection::ConnectionValidator;
use crate::definition::Workflow;
use crate::edge::{Connection, Edge, PortRef};
use crate::error::{EditorError, GraphError};
use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeKind, NodePatch};
use crate::structure::{StructureReport, analyze_structure};
use crate::validate::{GraphValidator, ValidationIssues};
use flowsmith_core::{EdgeId, NodeId, Result};
use tracing::{debug, info, instrument};

/// An editing session over one workflow.
#[derive(Debug, Clone)]
pub struct WorkflowEditor {
    workflow: Workflow,
    catalog: NodeCatalog,
    issues: ValidationIssues,
}

impl WorkflowEditor {
    /// Opens a session on the starter workflow with the builtin catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(NodeCatalog::default())
    }

    /// Opens a session on the starter workflow with a custom catalog.
    #[must_use]
    pub fn with_catalog(catalog: NodeCatalog) -> Self {
        let mut editor = Self {
            workflow: Workflow::seeded(),
            catalog,
            issues: ValidationIssues::default(),
        };
        editor.revalidate();
        editor
    }

    /// Opens a session on a workflow parsed from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or repeats a node or edge id.
    pub fn from_json(json: &str, catalog: NodeCatalog) -> Result<Self, EditorError> {
        let workflow: Workflow =
            serde_json::from_str(json).map_err(|e| EditorError::Serialization {
                details: e.to_string(),
            })?;
        let mut editor = Self::with_catalog(catalog);
        editor.load(workflow)?;
        Ok(editor)
    }

    /// Replaces the workflow being edited.
    ///
    /// # Errors
    ///
    /// Returns an error if the workflow repeats a node or edge id. The
    /// session keeps its previous workflow in that case.
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id))]
    pub fn load(&mut self, workflow: Workflow) -> Result<(), EditorError> {
        workflow
            .graph
            .check_unique_ids()
            .map_err(EditorError::from)?;
        self.workflow = workflow;
        self.revalidate();
        info!(
            nodes = self.graph().node_count(),
            edges = self.graph().edge_count(),
            "workflow loaded"
        );
        Ok(())
    }

    /// The workflow being edited.
    #[must_use]
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// The graph being edited.
    #[must_use]
    pub fn graph(&self) -> &WorkflowGraph {
        &self.workflow.graph
    }

    /// The catalog this session validates against.
    #[must_use]
    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    /// Diagnostics for the current graph.
    #[must_use]
    pub fn issues(&self) -> &ValidationIssues {
        &self.issues
    }

    /// Structural report for the current graph.
    #[must_use]
    pub fn structure(&self) -> StructureReport {
        analyze_structure(self.graph())
    }

    /// Adds a node of the given kind with catalog defaults.
    ///
    /// The label is the kind's display name followed by the new node count,
    /// e.g. `Webhook 3`.
    #[instrument(skip(self))]
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.unused_node_id(NodeId::generate);
        let label = format!("{} {}", kind.display_name(), self.graph().node_count() + 1);
        let node =
            Node::new(id.clone(), kind, label).with_params(self.catalog.default_params(kind));
        let added = self.workflow.graph.add_node(node);
        debug_assert!(added.is_ok(), "minted node id is unused");
        self.revalidate();
        info!(node_id = %id, "node added");
        id
    }

    /// Updates a node's label and/or parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    #[instrument(skip(self, patch))]
    pub fn update_node(
        &mut self,
        node_id: &NodeId,
        patch: NodePatch,
    ) -> Result<(), EditorError> {
        self.workflow
            .graph
            .update_node(node_id, patch)
            .map_err(EditorError::from)?;
        self.revalidate();
        info!("node updated");
        Ok(())
    }

    /// Removes a node and every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    #[instrument(skip(self))]
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<Node, EditorError> {
        let (node, edges) =
            self.workflow
                .graph
                .remove_node(node_id)
                .ok_or_else(|| GraphError::NodeNotFound {
                    node_id: node_id.clone(),
                })
                .map_err(EditorError::from)?;
        self.revalidate();
        info!(removed_edges = edges.len(), "node removed");
        Ok(node)
    }

    /// Returns true if the candidate passes every connection rule.
    ///
    /// Cheap enough to call on every drag frame.
    #[must_use]
    pub fn can_connect(&self, candidate: &Connection) -> bool {
        self.validator().is_valid(candidate, self.graph())
    }

    /// Adds an edge after checking the connection rules.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ConnectionRejected`] naming the failed rule.
    #[instrument(skip(self), fields(source = %candidate.source, target = %candidate.target))]
    pub fn connect(&mut self, candidate: &Connection) -> Result<EdgeId, EditorError> {
        self.validator()
            .check(candidate, self.graph())
            .map_err(EditorError::ConnectionRejected)?;

        let (from, to) =
            candidate.endpoints(self.catalog.default_output(), self.catalog.default_input());
        let edge_id = EdgeId::generate();
        self.workflow
            .graph
            .insert_edge(Edge::new(edge_id.clone(), from, to))
            .map_err(EditorError::from)?;
        self.revalidate();
        info!(edge_id = %edge_id, "edge added");
        Ok(edge_id)
    }

    /// Removes an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    #[instrument(skip(self))]
    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> Result<Edge, EditorError> {
        let edge = self
            .workflow
            .graph
            .remove_edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })
            .map_err(EditorError::from)?;
        self.revalidate();
        info!("edge removed");
        Ok(edge)
    }

    /// Returns true if an edge with exactly these endpoints exists.
    #[must_use]
    pub fn edge_exists(&self, candidate: &Connection) -> bool {
        let (from, to) =
            candidate.endpoints(self.catalog.default_output(), self.catalog.default_input());
        self.graph().has_edge_between(&from, &to)
    }

    /// Lists the input ports the given output could connect to right now.
    #[must_use]
    pub fn compatible_ports(&self, source_node: &NodeId, source_port: &str) -> Vec<PortRef> {
        self.validator()
            .targets_for(&PortRef::new(source_node.clone(), source_port), self.graph())
    }

    /// Serialises the workflow as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SaveBlocked`] if the graph holds dangling edge
    /// references or repeated node ids. Other issues do not block saving.
    pub fn to_json(&self) -> Result<String, EditorError> {
        if self.issues.blocks_save() {
            return Err(EditorError::SaveBlocked {
                blocking: self.issues.blocking_count(),
            }
            .into());
        }
        let json = serde_json::to_string_pretty(&self.workflow).map_err(|e| {
            EditorError::Serialization {
                details: e.to_string(),
            }
        })?;
        Ok(json)
    }

    fn validator(&self) -> ConnectionValidator<'_> {
        ConnectionValidator::new(&self.catalog)
    }

    fn revalidate(&mut self) {
        self.issues = GraphValidator::new(&self.catalog).validate(&self.workflow.graph);
    }

    /// Mints ids until one is not taken by a node already in the graph.
    fn unused_node_id(&self, mut mint: impl FnMut() -> NodeId) -> NodeId {
        loop {
            let id = mint();
            if self.graph().get_node(&id).is_none() {
                return id;
            }
            debug!(node_id = %id, "minted node id already taken");
        }
    }
}

impl Default for WorkflowEditor {
    fn default() -> Self {
        Self::new()
    }
}
