//! Data-shape diffing between paired backend DTOs and frontend types
//!
//! Only names present on both sides are compared; a type that exists on one
//! side only is a naming gap, not a mismatch. Field types are informational
//! and never participate.

use crate::snapshot::FieldMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShapeMismatch {
    /// Type name shared by both sides
    pub dto: String,
    /// Fields the frontend type lacks (sorted)
    pub only_backend: Vec<String>,
    /// Fields the backend DTO lacks (sorted)
    pub only_frontend: Vec<String>,
}

/// Field-name set difference for every commonly named type.
pub fn diff_shapes(
    backend: &BTreeMap<String, FieldMap>,
    frontend: &BTreeMap<String, FieldMap>,
) -> Vec<ShapeMismatch> {
    backend
        .iter()
        .filter_map(|(name, backend_fields)| {
            let frontend_fields = frontend.get(name)?;

            let b: BTreeSet<&String> = backend_fields.keys().collect();
            let f: BTreeSet<&String> = frontend_fields.keys().collect();

            let only_backend: Vec<String> = b.difference(&f).map(|s| s.to_string()).collect();
            let only_frontend: Vec<String> = f.difference(&b).map(|s| s.to_string()).collect();

            if only_backend.is_empty() && only_frontend.is_empty() {
                None
            } else {
                Some(ShapeMismatch {
                    dto: name.clone(),
                    only_backend,
                    only_frontend,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(names: &[&str]) -> FieldMap {
        names
            .iter()
            .map(|n| (n.to_string(), "string".to_string()))
            .collect()
    }

    #[test]
    fn test_asymmetric_fields() {
        let backend = BTreeMap::from([("Item".to_string(), fields(&["id", "name"]))]);
        let frontend = BTreeMap::from([("Item".to_string(), fields(&["id", "label"]))]);

        assert_eq!(
            diff_shapes(&backend, &frontend),
            vec![ShapeMismatch {
                dto: "Item".into(),
                only_backend: vec!["name".into()],
                only_frontend: vec!["label".into()],
            }]
        );
    }

    #[test]
    fn test_types_on_one_side_are_ignored() {
        let backend = BTreeMap::from([("ServerOnly".to_string(), fields(&["a"]))]);
        let frontend = BTreeMap::from([("ClientOnly".to_string(), fields(&["b"]))]);
        assert!(diff_shapes(&backend, &frontend).is_empty());
    }

    #[test]
    fn test_field_types_do_not_matter() {
        let backend = BTreeMap::from([(
            "Money".to_string(),
            FieldMap::from([("amount".to_string(), "decimal".to_string())]),
        )]);
        let frontend = BTreeMap::from([(
            "Money".to_string(),
            FieldMap::from([("amount".to_string(), "number".to_string())]),
        )]);
        assert!(diff_shapes(&backend, &frontend).is_empty());
    }
}
