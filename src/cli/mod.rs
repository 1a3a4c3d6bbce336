//! CLI command implementations
//!
//! This module contains all CLI command handlers, organized by category:
//! - `extract`: snapshot extraction from source trees
//! - `reconcile`: reconciliation, markdown report and the full audit pipeline
//! - `config`: configuration checks and schema output
//! - `util`: shared helpers

pub mod config;
pub mod extract;
pub mod reconcile;
pub mod util;

pub use config::{cmd_config_check, cmd_schema, SchemaName};
pub use extract::{cmd_extract_backend, cmd_extract_frontend};
pub use reconcile::{cmd_audit, cmd_reconcile, cmd_report, AuditArgs, ReconcileArgs, ReportArgs};
