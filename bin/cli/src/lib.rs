//! The `flowsmith` command line tool.
//!
//! Checks workflow files against the connection and validation rules from
//! `flowsmith-workflow`, using a node catalog configured through
//! [`config::CliConfig`].

pub mod commands;
pub mod config;
pub mod error;

pub use commands::Outcome;
pub use config::CliConfig;
pub use error::CliError;
