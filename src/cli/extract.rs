//! Extraction commands

use super::util::write_output;
use std::path::Path;
use surface_audit::{extract_backend, extract_frontend, AuditConfig, Result};

pub fn cmd_extract_backend(dir: &Path, output: Option<&Path>, config: &AuditConfig) -> Result<()> {
    let snapshot = extract_backend(dir, &config.extract)?;
    write_output(output, &serde_json::to_string_pretty(&snapshot)?)
}

pub fn cmd_extract_frontend(dir: &Path, output: Option<&Path>, config: &AuditConfig) -> Result<()> {
    let snapshot = extract_frontend(dir, &config.extract)?;
    write_output(output, &serde_json::to_string_pretty(&snapshot)?)
}
