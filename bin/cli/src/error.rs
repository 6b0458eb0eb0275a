//! CLI error types.

use std::fmt;
use std::path::PathBuf;

/// Errors that stop a `flowsmith` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The configured catalog overrides are invalid.
    Catalog { details: String },
    /// A workflow file could not be read or written.
    Io { path: PathBuf, details: String },
    /// A workflow file could not be parsed or saved.
    Workflow { path: PathBuf, details: String },
    /// Output could not be rendered.
    Render { details: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::Catalog { details } => write!(f, "invalid node catalog: {details}"),
            Self::Io { path, details } => write!(f, "{}: {details}", path.display()),
            Self::Workflow { path, details } => {
                write!(f, "invalid workflow {}: {details}", path.display())
            }
            Self::Render { details } => write!(f, "failed to render output: {details}"),
        }
    }
}

impl std::error::Error for CliError {}
