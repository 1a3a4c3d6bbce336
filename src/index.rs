//! Endpoint index: stage one of reconciliation
//!
//! Folds every declared server endpoint into a `CanonicalKey → EndpointRecord`
//! table. The index is immutable once built; which records were used is
//! answered against the key set produced by the matcher.

use crate::canon::CanonicalKey;
use crate::snapshot::BackendSnapshot;
use std::collections::{BTreeSet, HashMap};

/// A declared server endpoint, keyed by `(verb, canonical path)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    pub key: CanonicalKey,
    pub controller: String,
    pub method: String,
    pub request_dto: String,
    pub response_dto: String,
    /// Route as declared, kept for reporting
    pub original_route: String,
}

/// Two declarations that canonicalize to the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: CanonicalKey,
    /// `Controller.method` that was overwritten
    pub replaced: String,
    /// `Controller.method` that now owns the key
    pub winner: String,
}

/// Canonical-key lookup table over backend endpoints
#[derive(Debug, Clone, Default)]
pub struct EndpointIndex {
    records: Vec<EndpointRecord>,
    positions: HashMap<CanonicalKey, usize>,
    collisions: Vec<KeyCollision>,
}

impl EndpointIndex {
    /// Build the index from every controller endpoint in the snapshot.
    ///
    /// A later declaration whose key collides with an earlier one replaces it
    /// in place (last write wins, first position kept).
    pub fn build(backend: &BackendSnapshot) -> Self {
        let mut index = Self::default();

        for controller in &backend.controllers {
            for endpoint in &controller.endpoints {
                index.insert(EndpointRecord {
                    key: CanonicalKey::from_raw(&endpoint.http_method, &endpoint.route),
                    controller: controller.name.clone(),
                    method: endpoint.method.clone(),
                    request_dto: endpoint.request_dto.clone(),
                    response_dto: endpoint.response_dto.clone(),
                    original_route: endpoint.route.clone(),
                });
            }
        }

        tracing::info!(
            endpoints = index.len(),
            collisions = index.collisions.len(),
            "built endpoint index"
        );
        index
    }

    fn insert(&mut self, record: EndpointRecord) {
        match self.positions.get(&record.key) {
            Some(&pos) => {
                let previous = &self.records[pos];
                let collision = KeyCollision {
                    key: record.key.clone(),
                    replaced: format!("{}.{}", previous.controller, previous.method),
                    winner: format!("{}.{}", record.controller, record.method),
                };
                tracing::warn!(
                    key = %collision.key,
                    replaced = %collision.replaced,
                    winner = %collision.winner,
                    "duplicate canonical route, keeping the later declaration"
                );
                self.collisions.push(collision);
                self.records[pos] = record;
            }
            None => {
                self.positions.insert(record.key.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn lookup(&self, key: &CanonicalKey) -> Option<&EndpointRecord> {
        self.positions.get(key).map(|&pos| &self.records[pos])
    }

    /// Whether any call resolved to `key`
    pub fn is_used(&self, key: &CanonicalKey, matched: &BTreeSet<CanonicalKey>) -> bool {
        self.positions.contains_key(key) && matched.contains(key)
    }

    /// Records no call resolved to, in declaration order
    pub fn unused<'a>(
        &'a self,
        matched: &'a BTreeSet<CanonicalKey>,
    ) -> impl Iterator<Item = &'a EndpointRecord> + 'a {
        self.records.iter().filter(move |r| !matched.contains(&r.key))
    }

    pub fn records(&self) -> &[EndpointRecord] {
        &self.records
    }

    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
