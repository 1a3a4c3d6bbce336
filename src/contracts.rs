//! Interface completeness
//!
//! Cross-references the methods an interface declares against every class
//! claiming to implement it. Each implementation must cover the whole
//! contract on its own; coverage is never pooled across implementations.

use crate::snapshot::{BackendSnapshot, Implementation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Implementation name used when no class claims an interface
pub const NO_IMPLEMENTATION: &str = "NONE";

/// Declared interface methods missing from one implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnimplementedMethod {
    pub interface: String,
    /// Implementing class, or `NONE`
    pub implementation: String,
    /// Declared names, original case and declaration order
    pub missing: Vec<String>,
}

/// Check every interface with at least one declared method.
pub fn check_interfaces(backend: &BackendSnapshot) -> Vec<UnimplementedMethod> {
    check_contracts(&backend.interfaces, &backend.implementations)
}

pub fn check_contracts(
    interfaces: &BTreeMap<String, Vec<String>>,
    implementations: &BTreeMap<String, Implementation>,
) -> Vec<UnimplementedMethod> {
    let mut findings = Vec::new();

    for (interface, declared) in interfaces {
        let declared = dedup(declared);
        if declared.is_empty() {
            continue;
        }

        let claimants: Vec<_> = implementations
            .iter()
            .filter(|(_, imp)| imp.interfaces.iter().any(|i| i == interface))
            .collect();

        if claimants.is_empty() {
            tracing::debug!(%interface, "interface has no implementation");
            findings.push(UnimplementedMethod {
                interface: interface.clone(),
                implementation: NO_IMPLEMENTATION.to_string(),
                missing: declared,
            });
            continue;
        }

        for (name, imp) in claimants {
            let defined: HashSet<String> = imp.methods.iter().map(|m| m.to_lowercase()).collect();
            let missing: Vec<String> = declared
                .iter()
                .filter(|m| !defined.contains(&m.to_lowercase()))
                .cloned()
                .collect();

            if !missing.is_empty() {
                findings.push(UnimplementedMethod {
                    interface: interface.clone(),
                    implementation: name.clone(),
                    missing,
                });
            }
        }
    }

    findings
}

/// Drop repeated declarations (overloads) keeping first occurrence
fn dedup(methods: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    methods
        .iter()
        .filter(|m| seen.insert(m.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn implementation(interfaces: &[&str], methods: &[&str]) -> Implementation {
        Implementation {
            interfaces: strings(interfaces),
            methods: strings(methods),
        }
    }

    #[test]
    fn test_missing_is_case_insensitive() {
        let interfaces = BTreeMap::from([("IThing".to_string(), strings(&["A", "B"]))]);
        let impls = BTreeMap::from([("Thing".to_string(), implementation(&["IThing"], &["a"]))]);

        let findings = check_contracts(&interfaces, &impls);
        assert_eq!(
            findings,
            vec![UnimplementedMethod {
                interface: "IThing".into(),
                implementation: "Thing".into(),
                missing: strings(&["B"]),
            }]
        );
    }

    #[test]
    fn test_unclaimed_interface_reports_none() {
        let interfaces = BTreeMap::from([("IOrphan".to_string(), strings(&["Run", "Stop"]))]);
        let findings = check_contracts(&interfaces, &BTreeMap::new());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].implementation, NO_IMPLEMENTATION);
        assert_eq!(findings[0].missing, strings(&["Run", "Stop"]));
    }

    #[test]
    fn test_empty_interface_is_skipped() {
        let interfaces = BTreeMap::from([("IMarker".to_string(), Vec::new())]);
        assert!(check_contracts(&interfaces, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_each_implementation_judged_alone() {
        let interfaces = BTreeMap::from([("IRepo".to_string(), strings(&["Get", "Save"]))]);
        let impls = BTreeMap::from([
            ("ReadRepo".to_string(), implementation(&["IRepo"], &["Get"])),
            ("WriteRepo".to_string(), implementation(&["IRepo"], &["Save"])),
            ("FullRepo".to_string(), implementation(&["IRepo", "IDisposable"], &["get", "save"])),
        ]);

        let findings = check_contracts(&interfaces, &impls);
        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.implementation.as_str(), f.missing.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![("ReadRepo", strings(&["Save"])), ("WriteRepo", strings(&["Get"]))]
        );
    }

    #[test]
    fn test_overloads_reported_once() {
        let interfaces =
            BTreeMap::from([("IStore".to_string(), strings(&["Find", "Find", "Count"]))]);
        let impls = BTreeMap::from([("Store".to_string(), implementation(&["IStore"], &["Count"]))]);

        let findings = check_contracts(&interfaces, &impls);
        assert_eq!(findings[0].missing, strings(&["Find"]));
    }
}
