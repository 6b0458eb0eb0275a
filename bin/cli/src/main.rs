use clap::{Parser, Subcommand};
use flowsmith_cli::{CliConfig, CliError, Outcome, commands};
use flowsmith_workflow::Connection;
use rootcause::Report;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "flowsmith")]
#[command(about = "Check workflow graphs against flowsmith's connection and validation rules")]
struct Cli {
    /// Catalog override file (TOML, JSON, or YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a workflow file and list per-node issues.
    Check {
        workflow: PathBuf,
        /// Print the issues as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check whether a connection may be added to a workflow file.
    Connect(ConnectArgs),
    /// Print the effective node catalog.
    Catalog,
}

#[derive(clap::Args, Debug)]
struct ConnectArgs {
    workflow: PathBuf,
    #[arg(long)]
    source: String,
    /// Output port on the source node; the catalog default when omitted.
    #[arg(long)]
    source_port: Option<String>,
    #[arg(long)]
    target: String,
    /// Input port on the target node; the catalog default when omitted.
    #[arg(long)]
    target_port: Option<String>,
    /// Add the edge and write the workflow back.
    #[arg(long)]
    write: bool,
}

impl ConnectArgs {
    fn candidate(&self) -> Connection {
        Connection {
            source: self.source.as_str().into(),
            source_handle: self.source_port.clone(),
            target: self.target.as_str().into(),
            target_handle: self.target_port.clone(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, Report<CliError>> {
    let config = CliConfig::load(cli.config.as_deref()).map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    let catalog = commands::build_catalog(&config)?;

    match cli.command {
        Commands::Check { workflow, json } => commands::check(&workflow, catalog, json),
        Commands::Connect(args) => {
            commands::connect(&args.workflow, catalog, &args.candidate(), args.write)
        }
        Commands::Catalog => commands::catalog(&catalog),
    }
}
