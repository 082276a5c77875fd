//! Storage statistics computed from the on-disk store.

use super::error::StorageError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Aggregate statistics over the persisted store.
///
/// Always computed by scanning the store directory rather than from
/// in-memory counters, so the numbers stay correct across process restarts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    /// Number of issue records on disk.
    pub total_issues: usize,
    /// Total bytes on disk, including attachment blobs.
    pub total_bytes: u64,
    /// Issue record count per `org/repo`.
    pub per_repository: BTreeMap<String, usize>,
}

/// Counts issue records under `issues_dir` (layout:
/// `<org>/<repo>/issue_<n>.json`), grouped by `org/repo`.
pub(super) fn scan_issue_records(
    issues_dir: &Path,
) -> Result<(usize, BTreeMap<String, usize>), StorageError> {
    let mut total = 0;
    let mut per_repository = BTreeMap::new();

    if !issues_dir.exists() {
        return Ok((total, per_repository));
    }

    for org_entry in read_dir(issues_dir)? {
        if !org_entry.is_dir() {
            continue;
        }
        let org_name = dir_name(&org_entry);

        for repo_entry in read_dir(&org_entry)? {
            if !repo_entry.is_dir() {
                continue;
            }
            let repo_name = dir_name(&repo_entry);

            let count = read_dir(&repo_entry)?
                .iter()
                .filter(|path| {
                    path.extension().is_some_and(|ext| ext == "json")
                })
                .count();

            if count > 0 {
                total += count;
                per_repository.insert(format!("{org_name}/{repo_name}"), count);
            }
        }
    }

    Ok((total, per_repository))
}

/// Sums the byte size of every file under `root`, recursively.
pub(super) fn scan_total_bytes(root: &Path) -> Result<u64, StorageError> {
    if !root.exists() {
        return Ok(0);
    }

    let mut bytes = 0;
    for path in read_dir(root)? {
        if path.is_dir() {
            bytes += scan_total_bytes(&path)?;
        } else {
            let metadata = path
                .metadata()
                .map_err(|e| StorageError::io(&path, e))?;
            bytes += metadata.len();
        }
    }
    Ok(bytes)
}

fn read_dir(dir: &Path) -> Result<Vec<std::path::PathBuf>, StorageError> {
    let entries = std::fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        paths.push(entry.path());
    }
    Ok(paths)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
