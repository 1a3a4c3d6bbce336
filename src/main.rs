//! surface-audit CLI - Command-line interface
//!
//! Commands:
//!   extract-backend   - Snapshot a server source tree
//!   extract-frontend  - Snapshot a client source tree
//!   reconcile         - Compare two snapshots (text or JSON)
//!   report            - Compare two snapshots (markdown audit)
//!   audit             - Extract, reconcile and write every document
//!   schema            - Print JSON schemas
//!   config check      - Validate a configuration file

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use surface_audit::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Reconcile a backend's declared HTTP surface with its frontend's calls
#[derive(Parser, Debug)]
#[command(name = "surface-audit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (default: ./surface-audit.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a backend snapshot from a server source tree
    ExtractBackend {
        /// Backend source root
        dir: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a frontend snapshot from a client source tree
    ExtractFrontend {
        /// Frontend source root
        dir: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reconcile two snapshots and print the text report or JSON result
    Reconcile(cli::ReconcileArgs),

    /// Reconcile two snapshots and render the markdown audit
    Report(cli::ReportArgs),

    /// Run the full pipeline over two source trees
    Audit(cli::AuditArgs),

    /// Print the JSON schema of a document
    Schema {
        #[arg(value_enum)]
        name: Option<cli::SchemaName>,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate a configuration file
    Check {
        /// File to check (default: --config or ./surface-audit.yaml)
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: Cli) -> Result<()> {
    let config_path = args.config.as_deref();

    match &args.command {
        Commands::Schema { name } => cli::cmd_schema(*name),
        Commands::Config(ConfigCommands::Check { file }) => {
            cli::cmd_config_check(file.as_deref(), config_path)
        }
        command => {
            let config = cli::util::load_config(config_path)?;
            tracing::debug!(?config, "loaded configuration");

            match command {
                Commands::ExtractBackend { dir, output } => {
                    cli::cmd_extract_backend(dir, output.as_deref(), &config)
                }
                Commands::ExtractFrontend { dir, output } => {
                    cli::cmd_extract_frontend(dir, output.as_deref(), &config)
                }
                Commands::Reconcile(args) => cli::cmd_reconcile(args, &config),
                Commands::Report(args) => cli::cmd_report(args, &config),
                Commands::Audit(args) => cli::cmd_audit(args, &config),
                Commands::Schema { .. } | Commands::Config(_) => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reconcile_flags() {
        let cli = Cli::parse_from([
            "surface-audit",
            "reconcile",
            "backend.json",
            "frontend.json",
            "--json",
            "--strict",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Reconcile(args) => {
                assert!(args.json);
                assert!(args.strict);
                assert_eq!(args.backend, PathBuf::from("backend.json"));
                assert!(args.root.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_audit_defaults_out_dir() {
        let cli = Cli::parse_from([
            "surface-audit",
            "audit",
            "--backend",
            "server",
            "--frontend",
            "web/src",
        ]);
        match cli.command {
            Commands::Audit(args) => assert_eq!(args.out_dir, PathBuf::from(".")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
