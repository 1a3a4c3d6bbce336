//! Reconcile, report and audit commands

use super::util::{write_all_atomic, write_output};
use clap::Args;
use std::path::{Path, PathBuf};
use surface_audit::snapshot::fingerprint;
use surface_audit::{
    extract_backend, extract_frontend, load_backend, load_frontend, reconcile, render_markdown,
    scan_empty_catches, scan_markers, AuditConfig, AuditStatus, BackendSnapshot, Error,
    FrontendSnapshot, ReconcileReport, Result,
};

/// Output file names written by `audit`
pub const BACKEND_FILE: &str = "backend_audit.json";
pub const FRONTEND_FILE: &str = "frontend_audit.json";
pub const ANALYSIS_FILE: &str = "integrity_analysis.json";
pub const MARKDOWN_FILE: &str = "system-integrity-audit.md";

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Backend snapshot (JSON or YAML)
    pub backend: PathBuf,

    /// Frontend snapshot (JSON or YAML)
    pub frontend: PathBuf,

    /// Source root scanned for markers and empty catch blocks
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Emit the JSON result document instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when the status is MAJOR DRIFT
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Backend snapshot (JSON or YAML)
    pub backend: PathBuf,

    /// Frontend snapshot (JSON or YAML)
    pub frontend: PathBuf,

    /// Source root scanned for markers and empty catch blocks
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Backend source root
    #[arg(long)]
    pub backend: PathBuf,

    /// Frontend source root
    #[arg(long)]
    pub frontend: PathBuf,

    /// Source root scanned for markers and empty catch blocks
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Directory receiving the four audit documents
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub fn cmd_reconcile(args: &ReconcileArgs, config: &AuditConfig) -> Result<()> {
    let (_, _, report) =
        load_and_reconcile(&args.backend, &args.frontend, args.root.as_deref(), config)?;

    let content = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        report.to_report()
    };
    write_output(args.output.as_deref(), &content)?;

    if args.strict && report.status == AuditStatus::MajorDrift {
        return Err(Error::Other(format!(
            "{}: {} broken calls, {} unimplemented interfaces, {} shape mismatches",
            report.status,
            report.summary.broken_calls_count,
            report.summary.unimplemented_methods_count,
            report.summary.shape_mismatches_count
        )));
    }
    Ok(())
}

pub fn cmd_report(args: &ReportArgs, config: &AuditConfig) -> Result<()> {
    let (backend, frontend, report) =
        load_and_reconcile(&args.backend, &args.frontend, args.root.as_deref(), config)?;

    let markdown = render_markdown(&backend, &frontend, &report, &config.match_options())?;
    write_output(args.output.as_deref(), &markdown)
}

/// Extract both sides, reconcile, and write every audit document
pub fn cmd_audit(args: &AuditArgs, config: &AuditConfig) -> Result<()> {
    let backend = extract_backend(&args.backend, &config.extract)?;
    let frontend = extract_frontend(&args.frontend, &config.extract)?;

    let backend_json = serde_json::to_string_pretty(&backend)?;
    let frontend_json = serde_json::to_string_pretty(&frontend)?;

    let report = reconcile(&backend, &frontend, &config.match_options())
        .with_inputs(
            Some(fingerprint(&backend_json)),
            Some(fingerprint(&frontend_json)),
        );
    let report = scan_root(report, args.root.as_deref(), config)?;

    // Render everything before touching the output directory
    let analysis_json = serde_json::to_string_pretty(&report)?;
    let markdown = render_markdown(&backend, &frontend, &report, &config.match_options())?;

    std::fs::create_dir_all(&args.out_dir).map_err(Error::Io)?;
    write_all_atomic(&[
        (args.out_dir.join(BACKEND_FILE), backend_json.as_str()),
        (args.out_dir.join(FRONTEND_FILE), frontend_json.as_str()),
        (args.out_dir.join(ANALYSIS_FILE), analysis_json.as_str()),
        (args.out_dir.join(MARKDOWN_FILE), markdown.as_str()),
    ])?;

    eprintln!("{}", report.to_report());
    eprintln!("Audit written to: {}", args.out_dir.display());
    Ok(())
}

fn load_and_reconcile(
    backend_path: &Path,
    frontend_path: &Path,
    root: Option<&Path>,
    config: &AuditConfig,
) -> Result<(BackendSnapshot, FrontendSnapshot, ReconcileReport)> {
    let backend = load_backend(backend_path)?;
    let frontend = load_frontend(frontend_path)?;

    let report = reconcile(&backend.value, &frontend.value, &config.match_options())
        .with_inputs(Some(backend.fingerprint), Some(frontend.fingerprint));
    let report = scan_root(report, root, config)?;

    Ok((backend.value, frontend.value, report))
}

fn scan_root(
    report: ReconcileReport,
    root: Option<&Path>,
    config: &AuditConfig,
) -> Result<ReconcileReport> {
    let Some(root) = root else {
        return Ok(report);
    };

    let todos = scan_markers(root, &config.markers)?;
    let empty_catches = scan_empty_catches(root, &config.markers.exclude_dirs)?;

    Ok(report
        .with_todos(todos, config.markers.limit)
        .with_empty_catches(empty_catches))
}
