//! Template context structures
//!
//! Flattens snapshots and a report into template-friendly views.

use crate::canon::{normalize_verb, CanonicalKey};
use crate::contracts::UnimplementedMethod;
use crate::index::EndpointIndex;
use crate::markers::MarkerHit;
use crate::matcher::{match_calls, resolve, MatchOptions};
use crate::reconcile::{
    AuditStatus, BrokenCall, DeadEndpoint, InputInfo, ReconcileReport, Summary,
};
use crate::shape::ShapeMismatch;
use crate::snapshot::{BackendSnapshot, FrontendSnapshot};
use serde::Serialize;

/// Context for the audit template
#[derive(Debug, Clone, Serialize)]
pub struct AuditContext {
    /// `PASS`, `WARN` or `FAIL`
    pub verdict: &'static str,
    pub status: String,
    pub status_note: &'static str,
    pub generated_at: String,
    pub inputs: InputInfo,
    pub summary: Summary,
    pub controllers: Vec<ControllerView>,
    pub services: Vec<ServiceView>,
    pub shape_mismatches: Vec<ShapeMismatch>,
    pub unimplemented_methods: Vec<UnimplementedMethod>,
    pub dead_endpoints: Vec<DeadEndpoint>,
    pub broken_calls: Vec<BrokenCall>,
    pub empty_catches: Vec<String>,
    pub todos: Vec<MarkerHit>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerView {
    pub name: String,
    pub endpoints: Vec<EndpointView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointView {
    pub method: String,
    pub route: String,
    pub http_method: String,
    pub request_dto: String,
    pub response_dto: String,
    /// Some call resolved to this endpoint's key
    pub used: bool,
    /// A later declaration took over this endpoint's key
    pub replaced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    pub name: String,
    pub calls: Vec<CallView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallView {
    pub name: String,
    pub verb: String,
    pub url: String,
    /// `Yes`, `No`, or `n/a` for calls with an unresolved URL
    pub matched: &'static str,
}

impl AuditContext {
    pub fn build(
        backend: &BackendSnapshot,
        frontend: &FrontendSnapshot,
        report: &ReconcileReport,
        options: &MatchOptions,
    ) -> Self {
        let index = EndpointIndex::build(backend);
        let outcome = match_calls(&index, frontend, options);

        let controllers = backend
            .controllers
            .iter()
            .map(|controller| ControllerView {
                name: controller.name.clone(),
                endpoints: controller
                    .endpoints
                    .iter()
                    .map(|e| {
                        let key = CanonicalKey::from_raw(&e.http_method, &e.route);
                        let replaced = index.lookup(&key).is_some_and(|r| {
                            r.controller != controller.name
                                || r.method != e.method
                                || r.original_route != e.route
                        });
                        EndpointView {
                            method: e.method.clone(),
                            route: e.route.clone(),
                            http_method: e.http_method.clone(),
                            request_dto: e.request_dto.clone(),
                            response_dto: e.response_dto.clone(),
                            used: !replaced && index.is_used(&key, &outcome.matched_keys),
                            replaced,
                        }
                    })
                    .collect(),
            })
            .collect();

        let services = frontend
            .services
            .iter()
            .map(|service| ServiceView {
                name: service.name.clone(),
                calls: service
                    .methods
                    .iter()
                    .map(|m| {
                        let matched = if m.url == options.unknown_url {
                            "n/a"
                        } else if resolve(&index, &CanonicalKey::from_raw(&m.verb, &m.url))
                            .is_some()
                        {
                            "Yes"
                        } else {
                            "No"
                        };
                        CallView {
                            name: m.name.clone(),
                            verb: normalize_verb(&m.verb),
                            url: m.url.clone(),
                            matched,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            verdict: report.status.verdict(),
            status: report.status.to_string(),
            status_note: status_note(report.status),
            generated_at: report.generated_at.clone(),
            inputs: report.inputs.clone(),
            summary: report.summary.clone(),
            controllers,
            services,
            shape_mismatches: report.shape_mismatches.clone(),
            unimplemented_methods: report.unimplemented_methods.clone(),
            dead_endpoints: report.dead_endpoints.clone(),
            broken_calls: report.broken_calls.clone(),
            empty_catches: report.empty_catches.clone(),
            todos: report.todos.clone(),
            recommendations: recommendations(report),
        }
    }
}

fn status_note(status: AuditStatus) -> &'static str {
    match status {
        AuditStatus::Aligned => "Backend and frontend surfaces agree.",
        AuditStatus::MinorDrift => "Unused endpoints or open markers found; no contract is broken.",
        AuditStatus::MajorDrift => {
            "Critical mismatches or unimplemented logic detected. Deployment not recommended."
        }
    }
}

/// Action items derived from the report counters, most severe first
pub fn recommendations(report: &ReconcileReport) -> Vec<String> {
    let s = &report.summary;
    let mut out = Vec::new();

    if s.shape_mismatches_count > 0 {
        out.push(format!(
            "**Synchronize DTOs:** {} DTOs have field mismatches. Update frontend types and backend DTOs to match contracts.",
            s.shape_mismatches_count
        ));
    }
    if s.unimplemented_methods_count > 0 {
        let missing: usize = report
            .unimplemented_methods
            .iter()
            .map(|u| u.missing.len())
            .sum();
        out.push(format!(
            "**Implement Missing Service Logic:** {} interface methods across {} interfaces lack an implementation.",
            missing, s.unimplemented_methods_count
        ));
    }
    if s.broken_calls_count > 0 {
        out.push(format!(
            "**Fix Routing:** {} frontend calls point to non-existent or misconfigured routes.",
            s.broken_calls_count
        ));
    }
    if s.dead_endpoints_count > 0 {
        out.push(format!(
            "**Cleanup Dead Code:** {} endpoints are not consumed; verify whether they are for future use or can be removed.",
            s.dead_endpoints_count
        ));
    }
    if s.empty_catches_count > 0 {
        out.push(format!(
            "**Handle Exceptions:** {} files swallow exceptions in empty catch blocks.",
            s.empty_catches_count
        ));
    }
    if s.todos_count > 0 {
        out.push(format!(
            "**Address TODOs:** {} markers found.",
            s.todos_count
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchOptions;
    use crate::reconcile::reconcile;

    #[test]
    fn test_no_recommendations_when_aligned() {
        let report = reconcile(
            &BackendSnapshot::default(),
            &FrontendSnapshot::default(),
            &MatchOptions::default(),
        );
        assert!(recommendations(&report).is_empty());
    }

    #[test]
    fn test_recommendation_counts_follow_summary() {
        let report = reconcile(
            &BackendSnapshot::default(),
            &FrontendSnapshot::default(),
            &MatchOptions::default(),
        )
        .with_empty_catches(vec!["a.cs".into(), "b.cs".into()]);

        assert_eq!(
            recommendations(&report),
            vec!["**Handle Exceptions:** 2 files swallow exceptions in empty catch blocks."]
        );
    }
}
