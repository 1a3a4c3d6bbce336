//! Markdown audit rendering
//!
//! Uses a MiniJinja template embedded in the binary. The template only lays
//! out data; every decision (used / matched / recommendations) is made in
//! [`context::AuditContext`].

pub mod context;
pub mod filters;

use minijinja::Environment;
use std::sync::OnceLock;

use crate::error::Result;
use crate::matcher::MatchOptions;
use crate::reconcile::ReconcileReport;
use crate::snapshot::{BackendSnapshot, FrontendSnapshot};

pub use context::AuditContext;

/// Name of the embedded audit template
pub const AUDIT_TEMPLATE: &str = "audit.md.jinja";

mod embedded {
    pub const AUDIT: &str = include_str!("../../templates/audit.md.jinja");
}

static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    filters::register_filters(&mut env);

    env.add_template(AUDIT_TEMPLATE, embedded::AUDIT)
        .expect("Failed to load audit template");

    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Render the markdown audit document for one reconciliation run
pub fn render_markdown(
    backend: &BackendSnapshot,
    frontend: &FrontendSnapshot,
    report: &ReconcileReport,
    options: &MatchOptions,
) -> Result<String> {
    let ctx = AuditContext::build(backend, frontend, report, options);
    let template = engine().get_template(AUDIT_TEMPLATE)?;
    Ok(template.render(&ctx)?)
}
