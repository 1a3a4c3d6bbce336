//! Reconciliation: compare what the server declares with what the client calls
//!
//! Runs the two-stage pipeline (build the endpoint index, match calls against
//! it), the interface checker and the shape differ, and folds everything into
//! one immutable [`ReconcileReport`].

use crate::contracts::{check_interfaces, UnimplementedMethod};
use crate::index::EndpointIndex;
use crate::markers::MarkerHit;
use crate::matcher::{match_calls, MatchOptions, MatchOutcome};
use crate::shape::{diff_shapes, ShapeMismatch};
use crate::snapshot::{BackendSnapshot, FrontendSnapshot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reconcile a backend snapshot with a frontend snapshot
pub fn reconcile(
    backend: &BackendSnapshot,
    frontend: &FrontendSnapshot,
    options: &MatchOptions,
) -> ReconcileReport {
    let index = EndpointIndex::build(backend);
    let outcome = match_calls(&index, frontend, options);

    ReconcileReport::assemble(
        &index,
        &outcome,
        check_interfaces(backend),
        diff_shapes(&backend.dtos, &frontend.types),
    )
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AuditStatus {
    /// No findings at all
    Aligned,
    /// Dead endpoints or markers only
    MinorDrift,
    /// Broken calls, unimplemented methods or shape mismatches
    MajorDrift,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Aligned => write!(f, "ALIGNED"),
            AuditStatus::MinorDrift => write!(f, "MINOR DRIFT"),
            AuditStatus::MajorDrift => write!(f, "MAJOR DRIFT"),
        }
    }
}

impl AuditStatus {
    /// Markdown verdict word
    pub fn verdict(&self) -> &'static str {
        match self {
            AuditStatus::Aligned => "PASS",
            AuditStatus::MinorDrift => "WARN",
            AuditStatus::MajorDrift => "FAIL",
        }
    }
}

/// A declared endpoint no client call resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeadEndpoint {
    /// Route as declared
    pub route: String,
    /// Normalized verb
    pub method: String,
    pub controller: String,
}

/// A client call with no endpoint after primary and fallback lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BrokenCall {
    pub service: String,
    pub method: String,
    /// Canonical URL
    pub url: String,
    pub verb: String,
}

/// Fingerprints of the two input snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InputInfo {
    pub backend: Option<String>,
    pub frontend: Option<String>,
}

/// Scalar counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub total_backend_endpoints: usize,
    pub total_frontend_calls: usize,
    pub matched_calls: usize,
    pub dead_endpoints_count: usize,
    pub broken_calls_count: usize,
    pub unimplemented_methods_count: usize,
    pub todos_count: usize,
    pub shape_mismatches_count: usize,
    pub empty_catches_count: usize,
}

/// Result of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReconcileReport {
    pub status: AuditStatus,
    /// RFC 3339 timestamp
    pub generated_at: String,
    #[serde(default)]
    pub inputs: InputInfo,
    pub summary: Summary,
    pub broken_calls: Vec<BrokenCall>,
    pub dead_endpoints: Vec<DeadEndpoint>,
    pub unimplemented_methods: Vec<UnimplementedMethod>,
    #[serde(default)]
    pub shape_mismatches: Vec<ShapeMismatch>,
    #[serde(default)]
    pub todos: Vec<MarkerHit>,
    #[serde(default)]
    pub empty_catches: Vec<String>,
}

impl ReconcileReport {
    /// Aggregate stage outputs into a report.
    pub fn assemble(
        index: &EndpointIndex,
        outcome: &MatchOutcome,
        unimplemented_methods: Vec<UnimplementedMethod>,
        shape_mismatches: Vec<ShapeMismatch>,
    ) -> Self {
        let dead_endpoints: Vec<DeadEndpoint> = index
            .unused(&outcome.matched_keys)
            .map(|record| DeadEndpoint {
                route: record.original_route.clone(),
                method: record.key.verb().to_string(),
                controller: record.controller.clone(),
            })
            .collect();

        let broken_calls: Vec<BrokenCall> = outcome
            .unresolved()
            .map(|call| BrokenCall {
                service: call.service.clone(),
                method: call.method.clone(),
                url: call.url.clone(),
                verb: call.verb.clone(),
            })
            .collect();

        let summary = Summary {
            total_backend_endpoints: index.len(),
            total_frontend_calls: outcome.calls.len(),
            matched_calls: outcome.matched_count(),
            dead_endpoints_count: dead_endpoints.len(),
            broken_calls_count: broken_calls.len(),
            unimplemented_methods_count: unimplemented_methods.len(),
            todos_count: 0,
            shape_mismatches_count: shape_mismatches.len(),
            empty_catches_count: 0,
        };

        let mut report = Self {
            status: AuditStatus::Aligned,
            generated_at: chrono::Utc::now().to_rfc3339(),
            inputs: InputInfo::default(),
            summary,
            broken_calls,
            dead_endpoints,
            unimplemented_methods,
            shape_mismatches,
            todos: Vec::new(),
            empty_catches: Vec::new(),
        };
        report.status = report.compute_status();
        report
    }

    /// Attach marker hits; the count covers all of them, the list keeps `limit`
    pub fn with_todos(mut self, mut todos: Vec<MarkerHit>, limit: usize) -> Self {
        self.summary.todos_count = todos.len();
        todos.truncate(limit);
        self.todos = todos;
        self.status = self.compute_status();
        self
    }

    pub fn with_empty_catches(mut self, files: Vec<String>) -> Self {
        self.summary.empty_catches_count = files.len();
        self.empty_catches = files;
        self.status = self.compute_status();
        self
    }

    pub fn with_inputs(mut self, backend: Option<String>, frontend: Option<String>) -> Self {
        self.inputs = InputInfo { backend, frontend };
        self
    }

    fn compute_status(&self) -> AuditStatus {
        let s = &self.summary;
        if s.broken_calls_count > 0 || s.unimplemented_methods_count > 0 || s.shape_mismatches_count > 0
        {
            AuditStatus::MajorDrift
        } else if s.dead_endpoints_count > 0 || s.todos_count > 0 || s.empty_catches_count > 0 {
            AuditStatus::MinorDrift
        } else {
            AuditStatus::Aligned
        }
    }

    pub fn has_findings(&self) -> bool {
        self.status != AuditStatus::Aligned
    }

    /// Format as human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        out.push_str("API SURFACE REPORT\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n\n");

        out.push_str(&format!("Status: {}\n\n", self.status));

        if self.inputs.backend.is_some() || self.inputs.frontend.is_some() {
            out.push_str("Inputs:\n");
            if let Some(hash) = &self.inputs.backend {
                out.push_str(&format!("  backend:  [{}]\n", hash));
            }
            if let Some(hash) = &self.inputs.frontend {
                out.push_str(&format!("  frontend: [{}]\n", hash));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "Endpoints: {} declared, {} dead\n",
            s.total_backend_endpoints, s.dead_endpoints_count
        ));
        out.push_str(&format!(
            "Calls: {} total, {} matched, {} broken\n",
            s.total_frontend_calls, s.matched_calls, s.broken_calls_count
        ));
        out.push_str(&format!(
            "Contracts: {} unimplemented, {} shape mismatches\n",
            s.unimplemented_methods_count, s.shape_mismatches_count
        ));
        out.push_str(&format!(
            "Markers: {}, empty catches: {}\n\n",
            s.todos_count, s.empty_catches_count
        ));

        if !self.broken_calls.is_empty() {
            out.push_str("Broken calls:\n");
            for call in &self.broken_calls {
                out.push_str(&format!(
                    "  [ERROR] {} {} in {}.{}\n",
                    call.verb, call.url, call.service, call.method
                ));
            }
            out.push('\n');
        }

        if !self.unimplemented_methods.is_empty() {
            out.push_str("Unimplemented methods:\n");
            for item in &self.unimplemented_methods {
                out.push_str(&format!(
                    "  [ERROR] {} ({}): {}\n",
                    item.interface,
                    item.implementation,
                    item.missing.join(", ")
                ));
            }
            out.push('\n');
        }

        if !self.shape_mismatches.is_empty() {
            out.push_str("Shape mismatches:\n");
            for m in &self.shape_mismatches {
                out.push_str(&format!("  [ERROR] {}\n", m.dto));
                if !m.only_backend.is_empty() {
                    out.push_str(&format!("    backend only:  {}\n", m.only_backend.join(", ")));
                }
                if !m.only_frontend.is_empty() {
                    out.push_str(&format!("    frontend only: {}\n", m.only_frontend.join(", ")));
                }
            }
            out.push('\n');
        }

        if !self.dead_endpoints.is_empty() {
            out.push_str("Dead endpoints:\n");
            for d in &self.dead_endpoints {
                out.push_str(&format!("  [WARN] {} {} ({})\n", d.method, d.route, d.controller));
            }
            out.push('\n');
        }

        out
    }
}
