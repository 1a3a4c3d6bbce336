//! surface-audit configuration
//!
//! Loaded from `surface-audit.yaml` in the working directory or from an
//! explicit `--config` path. Every field has a default, so a missing file is
//! the same as an empty one.

use crate::error::{Error, Result};
use crate::matcher::{MatchOptions, UNKNOWN_URL};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "surface-audit.yaml";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub markers: MarkerConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            matching: MatchingConfig::default(),
            markers: MarkerConfig::default(),
            extract: ExtractConfig::default(),
        }
    }
}

/// Call matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchingConfig {
    /// URL sentinel for calls the extractor could not resolve
    #[serde(default = "default_unknown_url")]
    pub unknown_url: String,
}

fn default_unknown_url() -> String {
    UNKNOWN_URL.to_string()
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            unknown_url: default_unknown_url(),
        }
    }
}

/// Marker comment scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarkerConfig {
    /// Words matched case-insensitively
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// File extensions scanned (without dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Maximum marker entries kept in the report
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_patterns() -> Vec<String> {
    ["TODO", "FIXME", "PLACEHOLDER", "BUG", "MOCK"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["cs".into(), "ts".into(), "vue".into()]
}

fn default_exclude_dirs() -> Vec<String> {
    ["node_modules", ".git", "bin", "obj"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_limit() -> usize {
    200
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            limit: default_limit(),
        }
    }
}

/// Source layout for the extractors, relative to each source root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractConfig {
    #[serde(default = "default_controllers_dir")]
    pub controllers_dir: String,

    #[serde(default = "default_application_dir")]
    pub application_dir: String,

    #[serde(default = "default_services_dir")]
    pub services_dir: String,

    #[serde(default = "default_types_dir")]
    pub types_dir: String,

    /// Identifiers of HTTP client objects whose calls are collected
    #[serde(default = "default_http_clients")]
    pub http_clients: Vec<String>,
}

fn default_controllers_dir() -> String {
    "API/Controllers".to_string()
}

fn default_application_dir() -> String {
    "Application".to_string()
}

fn default_services_dir() -> String {
    "services".to_string()
}

fn default_types_dir() -> String {
    "types".to_string()
}

fn default_http_clients() -> Vec<String> {
    vec!["apiClient".to_string()]
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            controllers_dir: default_controllers_dir(),
            application_dir: default_application_dir(),
            services_dir: default_services_dir(),
            types_dir: default_types_dir(),
            http_clients: default_http_clients(),
        }
    }
}

impl AuditConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AuditConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `surface-audit.yaml` from a directory, defaults if absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported config version: {}",
                self.version
            )));
        }
        if self.markers.patterns.is_empty() {
            return Err(Error::Config(
                "At least one marker pattern is required".into(),
            ));
        }
        if self.markers.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Config("Marker patterns must not be empty".into()));
        }
        if self.extract.http_clients.is_empty() {
            return Err(Error::Config(
                "At least one HTTP client identifier is required".into(),
            ));
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            unknown_url: self.matching.unknown_url.clone(),
        }
    }
}
