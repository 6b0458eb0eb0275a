//! Command implementations.
//!
//! Each command returns an [`Outcome`] holding the text to print and whether
//! the command succeeded; `main` turns that into output and an exit code.

use crate::config::CliConfig;
use crate::error::CliError;
use flowsmith_core::{NodeId, Result};
use flowsmith_workflow::{
    Connection, ConnectionValidator, EditorError, NodeCatalog, ValidationIssues, WorkflowEditor,
};
use rootcause::Report;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn new(output: String, success: bool) -> Self {
        Self { output, success }
    }
}

/// Builds the node catalog with the configured overrides.
///
/// # Errors
///
/// Returns an error if the overrides are invalid.
pub fn build_catalog(config: &CliConfig) -> Result<NodeCatalog, CliError> {
    let catalog = NodeCatalog::from_config(&config.catalog).map_err(|e| CliError::Catalog {
        details: e.to_string(),
    })?;
    Ok(catalog)
}

fn open(path: &Path, catalog: NodeCatalog) -> Result<WorkflowEditor, CliError> {
    let json = fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    let editor = WorkflowEditor::from_json(&json, catalog).map_err(|e| CliError::Workflow {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    debug!(path = %path.display(), nodes = editor.graph().node_count(), "workflow opened");
    Ok(editor)
}

/// Validates a workflow file.
///
/// Fails when any issue is found. Structural findings (cycles, orphaned
/// nodes) are printed as warnings and do not affect the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn check(path: &Path, catalog: NodeCatalog, json: bool) -> Result<Outcome, CliError> {
    let editor = open(path, catalog)?;
    let issues = editor.issues();

    let output = if json {
        serde_json::to_string_pretty(issues).map_err(|e| CliError::Render {
            details: e.to_string(),
        })?
    } else {
        render_issues(&editor, issues)
    };

    info!(
        path = %path.display(),
        issues = issues.issue_count(),
        "workflow checked"
    );
    Ok(Outcome::new(output, issues.is_clean()))
}

fn render_issues(editor: &WorkflowEditor, issues: &ValidationIssues) -> String {
    let mut out = String::new();
    for (node_id, node_issues) in issues.iter() {
        let label = editor
            .graph()
            .get_node(node_id)
            .map_or("", |node| node.label.as_str());
        if node_issues.is_empty() {
            let _ = writeln!(out, "{node_id} ({label}): ok");
            continue;
        }
        let _ = writeln!(out, "{node_id} ({label}):");
        for issue in node_issues {
            let _ = writeln!(out, "  - {issue}");
        }
    }
    if !issues.graph_issues().is_empty() {
        let _ = writeln!(out, "graph:");
        for issue in issues.graph_issues() {
            let _ = writeln!(out, "  - {issue}");
        }
    }

    let structure = editor.structure();
    if structure.is_cyclic() {
        let _ = writeln!(out, "warning: cycle through {}", join(&structure.cyclic_nodes));
    }
    if !structure.orphaned_nodes.is_empty() {
        let _ = writeln!(
            out,
            "warning: orphaned nodes {}",
            join(&structure.orphaned_nodes)
        );
    }

    let _ = write!(
        out,
        "{} issue(s) across {} node(s)",
        issues.issue_count(),
        issues.node_count()
    );
    if issues.blocks_save() {
        let _ = write!(out, "; integrity issues block saving");
    }
    out
}

fn join(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks whether a connection may be added to a workflow file, and adds it
/// when `write` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or written back.
pub fn connect(
    path: &Path,
    catalog: NodeCatalog,
    candidate: &Connection,
    write: bool,
) -> Result<Outcome, CliError> {
    let mut editor = open(path, catalog)?;

    if let Err(rejection) =
        ConnectionValidator::new(editor.catalog()).check(candidate, editor.graph())
    {
        return Ok(Outcome::new(
            format!("rejected ({}): {rejection}", rejection.code()),
            false,
        ));
    }
    if !write {
        return Ok(Outcome::new("accepted".to_string(), true));
    }

    let workflow_error = |e: Report<EditorError>| CliError::Workflow {
        path: path.to_path_buf(),
        details: e.to_string(),
    };
    let edge_id = editor.connect(candidate).map_err(workflow_error)?;
    let json = editor.to_json().map_err(workflow_error)?;
    fs::write(path, json).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    info!(path = %path.display(), edge_id = %edge_id, "connection written");
    Ok(Outcome::new(format!("accepted; added edge {edge_id}"), true))
}

/// Prints the effective node catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be rendered.
pub fn catalog(catalog: &NodeCatalog) -> Result<Outcome, CliError> {
    let output = serde_json::to_string_pretty(catalog).map_err(|e| CliError::Render {
        details: e.to_string(),
    })?;
    Ok(Outcome::new(output, true))
}
