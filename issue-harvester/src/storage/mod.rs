//! Idempotent local persistence of collected issues.
//!
//! One JSON record per issue, keyed by (organization, repository, number).
//! Re-saving an existing key overwrites the prior record; records are
//! written through a temp file and renamed into place so a crashed or
//! cancelled write never leaves a truncated record.

mod error;
mod stats;

pub use error::StorageError;
pub use stats::StorageStats;

use crate::models::{Issue, StoredIssue};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manages the on-disk store of issue records and attachment blobs.
#[derive(Debug, Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a manager rooted at `base_dir`. Nothing is created on disk
    /// until the first save.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding issue records.
    #[must_use]
    pub fn issues_dir(&self) -> PathBuf {
        self.base_dir.join("issues")
    }

    /// Directory holding attachment blobs.
    #[must_use]
    pub fn attachments_dir(&self) -> PathBuf {
        self.base_dir.join("attachments")
    }

    /// Persists a batch of issues, grouping by each issue's own repository
    /// attribute.
    ///
    /// The grouping is independent of how the batch was collected, so an
    /// organization-wide sweep spanning several repositories lands each
    /// issue under its own repository directory. Returns the record paths
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a record cannot be written.
    pub fn save_issues(&self, org: &str, issues: Vec<Issue>) -> Result<Vec<PathBuf>, StorageError> {
        let mut paths = Vec::with_capacity(issues.len());
        let mut per_repo: BTreeMap<String, usize> = BTreeMap::new();

        for issue in issues {
            *per_repo.entry(issue.repository.clone()).or_default() += 1;
            paths.push(self.save_issue(org, issue)?);
        }

        info!(
            org,
            count = paths.len(),
            repositories = per_repo.len(),
            "Saved issue records"
        );
        Ok(paths)
    }

    /// Persists one issue record, overwriting any record with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record cannot be serialized or
    /// written.
    pub fn save_issue(&self, org: &str, issue: Issue) -> Result<PathBuf, StorageError> {
        let repo_dir = self.issues_dir().join(org).join(&issue.repository);
        std::fs::create_dir_all(&repo_dir).map_err(|e| StorageError::io(&repo_dir, e))?;

        let path = repo_dir.join(format!("issue_{}.json", issue.number));
        let record = StoredIssue {
            org: org.to_string(),
            repo: issue.repository.clone(),
            issue,
            collected_at: Utc::now(),
        };

        let json = serde_json::to_vec_pretty(&record)?;

        // Write-then-rename keeps the upsert atomic under interruption.
        let mut temp =
            tempfile::NamedTempFile::new_in(&repo_dir).map_err(|e| StorageError::io(&repo_dir, e))?;
        temp.write_all(&json).map_err(|e| StorageError::io(&path, e))?;
        temp.persist(&path)
            .map_err(|e| StorageError::io(&path, e.error))?;

        debug!(path = %path.display(), "Wrote issue record");
        Ok(path)
    }

    /// Loads one stored record by key, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record exists but cannot be read or
    /// parsed.
    pub fn load_issue(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<StoredIssue>, StorageError> {
        let path = self
            .issues_dir()
            .join(org)
            .join(repo)
            .join(format!("issue_{number}.json"));

        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Computes store statistics by scanning the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let (total_issues, per_repository) = stats::scan_issue_records(&self.issues_dir())?;
        let total_bytes = stats::scan_total_bytes(&self.base_dir)?;

        Ok(StorageStats {
            total_issues,
            total_bytes,
            per_repository,
        })
    }
}
