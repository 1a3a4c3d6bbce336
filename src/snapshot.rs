//! Extractor snapshot documents
//!
//! The two inputs of a reconciliation run: what the server declares and what
//! the client calls. Both are produced by the best-effort extractors (or any
//! other tool emitting the same shape) and read back from JSON or YAML.
//!
//! Decoding is lenient per record. A controller, endpoint, method or type entry
//! that does not decode is dropped with a warning instead of failing the whole
//! document; only an unreadable or syntactically broken file is fatal.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Field name → declared field type (informational only)
pub type FieldMap = BTreeMap<String, String>;

/// DTO name used when an endpoint has no request or response type
pub const NO_DTO: &str = "None";

fn no_dto() -> String {
    NO_DTO.to_string()
}

/// Everything extracted from the server-side codebase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackendSnapshot {
    #[serde(default, deserialize_with = "lenient::vec")]
    #[schemars(with = "Vec<Controller>")]
    pub controllers: Vec<Controller>,

    /// DTO name → fields
    #[serde(default, deserialize_with = "lenient::map")]
    #[schemars(with = "BTreeMap<String, FieldMap>")]
    pub dtos: BTreeMap<String, FieldMap>,

    /// Interface name → declared method names
    #[serde(default, deserialize_with = "lenient::map")]
    #[schemars(with = "BTreeMap<String, Vec<String>>")]
    pub interfaces: BTreeMap<String, Vec<String>>,

    /// Class name → claimed interfaces and defined methods
    #[serde(default, deserialize_with = "lenient::map")]
    #[schemars(with = "BTreeMap<String, Implementation>")]
    pub implementations: BTreeMap<String, Implementation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Controller {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::vec")]
    #[schemars(with = "Vec<Endpoint>")]
    pub endpoints: Vec<Endpoint>,
}

/// One declared server endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Endpoint {
    /// Raw route as written in source (may carry extraction noise)
    #[serde(default)]
    pub route: String,

    /// Verb token, e.g. `HttpGet`
    #[serde(default)]
    pub http_method: String,

    /// Declaring method name
    #[serde(default)]
    pub method: String,

    #[serde(default = "no_dto")]
    pub request_dto: String,

    #[serde(default = "no_dto")]
    pub response_dto: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Implementation {
    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub methods: Vec<String>,
}

/// Everything extracted from the client-side codebase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrontendSnapshot {
    #[serde(default, deserialize_with = "lenient::vec")]
    #[schemars(with = "Vec<Service>")]
    pub services: Vec<Service>,

    /// Exported type name → fields
    #[serde(default, deserialize_with = "lenient::map")]
    #[schemars(with = "BTreeMap<String, FieldMap>")]
    pub types: BTreeMap<String, FieldMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Service {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::vec")]
    #[schemars(with = "Vec<ServiceMethod>")]
    pub methods: Vec<ServiceMethod>,
}

/// One client call site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceMethod {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub verb: String,

    /// Raw URL, or the unknown sentinel when the extractor could not resolve it
    #[serde(default)]
    pub url: String,
}

/// A snapshot read from disk, with a fingerprint of its bytes
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub path: PathBuf,
    pub fingerprint: String,
    pub value: T,
}

/// Load a backend snapshot from a `.json`, `.yaml` or `.yml` file
pub fn load_backend(path: &Path) -> Result<Loaded<BackendSnapshot>> {
    load(path)
}

/// Load a frontend snapshot from a `.json`, `.yaml` or `.yml` file
pub fn load_frontend(path: &Path) -> Result<Loaded<FrontendSnapshot>> {
    load(path)
}

fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Loaded<T>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value = parse_document(path, &content)?;
    tracing::info!(path = %path.display(), "loaded snapshot");

    Ok(Loaded {
        path: path.to_path_buf(),
        fingerprint: fingerprint(&content),
        value,
    })
}

fn parse_document<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed = if is_yaml {
        serde_norway::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| Error::SnapshotParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Short content hash, e.g. `sha256:238924e827da9055`
pub fn fingerprint(content: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
}

/// Per-record tolerant decoding for snapshot collections.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            Value::Null => return Ok(Vec::new()),
            other => {
                tracing::warn!(found = %kind(&other), "expected a list, ignoring field");
                return Ok(Vec::new());
            }
        };

        Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect())
    }

    pub fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let entries = match Value::deserialize(deserializer)? {
            Value::Object(entries) => entries,
            Value::Null => return Ok(BTreeMap::new()),
            other => {
                tracing::warn!(found = %kind(&other), "expected a mapping, ignoring field");
                return Ok(BTreeMap::new());
            }
        };

        Ok(entries
            .into_iter()
            .filter_map(|(name, item)| match serde_json::from_value(item) {
                Ok(value) => Some((name, value)),
                Err(e) => {
                    tracing::warn!(entry = %name, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect())
    }

    fn kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "mapping",
        }
    }
}
