//! CLI utility helpers

use std::fs;
use std::path::{Path, PathBuf};
use surface_audit::{AuditConfig, Error, Result};

/// Write content to a file or stdout.
///
/// Files are written to a sibling temporary file first and renamed over the
/// target, so a failed run never leaves a truncated document behind.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            write_atomic(p, content)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = temp_sibling(path);
    fs::write(&tmp, content).map_err(Error::Io)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Write a set of files, replacing none of them unless every one was staged.
///
/// All temporary siblings are written first; a failed write removes the ones
/// already staged and leaves every target untouched.
pub fn write_all_atomic(files: &[(PathBuf, &str)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for (path, content) in files {
        let tmp = temp_sibling(path);
        if let Err(e) = fs::write(&tmp, content) {
            let _ = fs::remove_file(&tmp);
            for (written, _) in &staged {
                let _ = fs::remove_file(written);
            }
            return Err(Error::Io(e));
        }
        staged.push((tmp, path.as_path()));
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            for (pending, _) in &staged[i..] {
                let _ = fs::remove_file(pending);
            }
            return Err(Error::Io(e));
        }
        tracing::debug!(path = %path.display(), "wrote output");
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Explicit `--config` file, else `surface-audit.yaml` in the working directory
pub fn load_config(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(p) => AuditConfig::load(p),
        None => {
            let cwd = std::env::current_dir().map_err(Error::Io)?;
            AuditConfig::load_from_dir(&cwd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.json");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, "new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!dir.path().join(".report.json.tmp").exists());
    }

    #[test]
    fn test_write_all_atomic_replaces_every_target() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("backend.json");
        let second = dir.path().join("frontend.json");
        fs::write(&first, "old").unwrap();

        write_all_atomic(&[(first.clone(), "b"), (second.clone(), "f")]).unwrap();

        assert_eq!(fs::read_to_string(&first).unwrap(), "b");
        assert_eq!(fs::read_to_string(&second).unwrap(), "f");
        assert!(!dir.path().join(".backend.json.tmp").exists());
    }

    #[test]
    fn test_write_all_atomic_failure_keeps_existing_targets() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("backend.json");
        let second = dir.path().join("missing").join("analysis.json");
        fs::write(&first, "old").unwrap();

        assert!(write_all_atomic(&[(first.clone(), "new"), (second.clone(), "x")]).is_err());

        assert_eq!(fs::read_to_string(&first).unwrap(), "old");
        assert!(!dir.path().join(".backend.json.tmp").exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_write_atomic_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("report.json");
        assert!(write_atomic(&target, "x").is_err());
        assert!(!target.exists());
    }
}
