//! Config and schema CLI commands

use clap::ValueEnum;
use std::path::Path;
use surface_audit::config::CONFIG_FILE;
use surface_audit::{AuditConfig, BackendSnapshot, FrontendSnapshot, ReconcileReport, Result};

/// Documents with a published JSON schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaName {
    Backend,
    Frontend,
    Report,
    Config,
}

pub fn cmd_schema(name: Option<SchemaName>) -> Result<()> {
    match name {
        None => {
            println!("Available schemas: backend, frontend, report, config");
            Ok(())
        }
        Some(SchemaName::Backend) => print_schema::<BackendSnapshot>(),
        Some(SchemaName::Frontend) => print_schema::<FrontendSnapshot>(),
        Some(SchemaName::Report) => print_schema::<ReconcileReport>(),
        Some(SchemaName::Config) => print_schema::<AuditConfig>(),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Validate a config file; `file` wins over the global `--config`
pub fn cmd_config_check(file: Option<&Path>, global: Option<&Path>) -> Result<()> {
    let path = file
        .or(global)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(CONFIG_FILE).to_path_buf());

    let config = AuditConfig::load(&path)?;

    println!("✓ Configuration is valid: {}", path.display());
    println!(
        "  markers: {} patterns, limit {}",
        config.markers.patterns.len(),
        config.markers.limit
    );
    println!(
        "  http clients: {}",
        config.extract.http_clients.join(", ")
    );
    Ok(())
}
