//! Core domain types for flowsmith.
//!
//! This crate provides the identifier types and the error handling alias
//! shared by the workflow library and the command line tool.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, NodeId, ParseIdError, WorkflowId};
