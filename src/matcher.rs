//! Call matcher: stage two of reconciliation
//!
//! Resolves every client call against the read-only [`EndpointIndex`]:
//! the primary key first, then the same key with its `api/` prefix removed.
//! Each call is resolved independently, so the outcome does not depend on
//! call order.

use crate::canon::CanonicalKey;
use crate::index::EndpointIndex;
use crate::snapshot::FrontendSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// URL recorded by extractors when a call target could not be resolved
pub const UNKNOWN_URL: &str = "Unknown";

/// Matching configuration
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Calls with exactly this URL are excluded from all accounting
    pub unknown_url: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            unknown_url: UNKNOWN_URL.to_string(),
        }
    }
}

/// Which lookup found the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Primary,
    /// Matched after dropping the `api/` prefix
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResolution {
    /// Index key the call resolved to
    pub key: CanonicalKey,
    pub strategy: Strategy,
}

/// One client call and how it resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCallRecord {
    pub service: String,
    pub method: String,
    /// Normalized verb
    pub verb: String,
    /// Canonical URL with the `api` prefix
    pub url: String,
    pub key: CanonicalKey,
    pub resolution: Option<CallResolution>,
}

impl ClientCallRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// Result of the matching pass
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub calls: Vec<ClientCallRecord>,
    /// Index keys at least one call resolved to
    pub matched_keys: BTreeSet<CanonicalKey>,
    /// Calls skipped because their URL was the unknown sentinel
    pub skipped_unknown: usize,
}

impl MatchOutcome {
    pub fn matched_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_resolved()).count()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ClientCallRecord> {
        self.calls.iter().filter(|c| !c.is_resolved())
    }
}

/// Resolve a single key: primary lookup, then the `api/`-stripped fallback.
pub fn resolve(index: &EndpointIndex, key: &CanonicalKey) -> Option<CallResolution> {
    if index.lookup(key).is_some() {
        return Some(CallResolution {
            key: key.clone(),
            strategy: Strategy::Primary,
        });
    }

    let alternate = key.without_api_prefix()?;
    if index.lookup(&alternate).is_some() {
        tracing::debug!(call = %key, endpoint = %alternate, "resolved through fallback key");
        return Some(CallResolution {
            key: alternate,
            strategy: Strategy::Fallback,
        });
    }

    None
}

/// Match every frontend call against the index.
pub fn match_calls(
    index: &EndpointIndex,
    frontend: &FrontendSnapshot,
    options: &MatchOptions,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for service in &frontend.services {
        for method in &service.methods {
            if method.url == options.unknown_url {
                outcome.skipped_unknown += 1;
                continue;
            }

            let key = CanonicalKey::from_raw(&method.verb, &method.url);
            let resolution = resolve(index, &key);

            if let Some(res) = &resolution {
                outcome.matched_keys.insert(res.key.clone());
            }

            outcome.calls.push(ClientCallRecord {
                service: service.name.clone(),
                method: method.name.clone(),
                verb: key.verb().to_string(),
                url: key.path().to_string(),
                key,
                resolution,
            });
        }
    }

    tracing::info!(
        calls = outcome.calls.len(),
        matched = outcome.matched_count(),
        skipped_unknown = outcome.skipped_unknown,
        "matched client calls"
    );
    outcome
}
