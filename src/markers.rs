//! Source tree scans: marker comments and empty catch blocks
//!
//! Plain text harvesting over a source root. Unreadable files are skipped;
//! nothing here can fail a run once the root itself is walkable.

use crate::config::MarkerConfig;
use crate::error::Result;
use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One line carrying a marker word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MarkerHit {
    /// Path relative to the scanned root
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// Trimmed line text
    pub content: String,
}

/// Build the case-insensitive alternation of all marker words
pub fn marker_pattern(config: &MarkerConfig) -> Result<Regex> {
    let alternation = config
        .patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    Ok(RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()?)
}

/// Files under `root` with a configured extension, outside excluded dirs
pub(crate) fn source_files<'a>(
    root: &'a Path,
    extensions: &'a [String],
    exclude_dirs: &'a [String],
) -> impl Iterator<Item = PathBuf> + 'a {
    let excluded = move |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| exclude_dirs.iter().any(|d| d == name))
    };

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !excluded(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(move |path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|x| x == ext))
        })
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Every marker line under `root`, in path order
pub fn scan_markers(root: &Path, config: &MarkerConfig) -> Result<Vec<MarkerHit>> {
    // an empty alternation would match every line
    if config.patterns.iter().all(|p| p.trim().is_empty()) {
        tracing::warn!("no marker patterns configured, skipping marker scan");
        return Ok(Vec::new());
    }
    let pattern = marker_pattern(config)?;
    let mut hits = Vec::new();

    for path in source_files(root, &config.extensions, &config.exclude_dirs) {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let file = relative(root, &path);
        for (i, line) in content.lines().enumerate() {
            if pattern.is_match(line) {
                hits.push(MarkerHit {
                    file: file.clone(),
                    line: i + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }

    tracing::info!(root = %root.display(), markers = hits.len(), "scanned marker comments");
    Ok(hits)
}

/// C# files containing a `catch` block with an empty body
pub fn scan_empty_catches(root: &Path, exclude_dirs: &[String]) -> Result<Vec<String>> {
    let pattern = Regex::new(r"catch\s*(\([^)]*\))?\s*\{\s*\}")?;
    let extensions = ["cs".to_string()];

    let found: Vec<String> = source_files(root, &extensions, exclude_dirs)
        .filter(|path| {
            std::fs::read_to_string(path)
                .map(|content| pattern.is_match(&content))
                .unwrap_or(false)
        })
        .map(|path| relative(root, &path))
        .collect();

    tracing::info!(root = %root.display(), files = found.len(), "scanned for empty catch blocks");
    Ok(found)
}
