//! Collection result types.

use crate::models::{AttachmentStatus, Issue};
use crate::search::RepositoryWarning;
use crate::storage::StorageStats;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of one collection operation.
///
/// Warnings are always enumerated, so partial success is distinguishable
/// from total success without inspecting logs.
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    /// Paths of the records written by this run, in save order.
    pub saved_paths: Vec<PathBuf>,

    /// Issues saved by this run, per repository.
    pub per_repository: BTreeMap<String, usize>,

    /// Total issues saved by this run.
    pub total_saved: usize,

    /// Attachments downloaded by this run.
    pub attachments_downloaded: usize,

    /// Attachments skipped or failed by this run.
    pub attachments_skipped: usize,

    /// Repositories skipped during an organization-wide sweep.
    pub warnings: Vec<RepositoryWarning>,

    /// Store statistics after the save, computed from disk.
    pub storage: StorageStats,
}

impl CollectionResult {
    /// Records per-repository and attachment tallies for one enriched issue.
    pub(crate) fn record_issue(&mut self, issue: &Issue) {
        *self
            .per_repository
            .entry(issue.repository.clone())
            .or_default() += 1;
        for attachment in &issue.attachments {
            match attachment.status {
                AttachmentStatus::Downloaded => self.attachments_downloaded += 1,
                AttachmentStatus::SkippedOversized | AttachmentStatus::Failed { .. } => {
                    self.attachments_skipped += 1
                }
                AttachmentStatus::Pending => {}
            }
        }
    }

    /// Returns true if every repository was collected without warnings.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, User};
    use chrono::Utc;

    #[test]
    fn tallies_attachment_outcomes() {
        let mut downloaded = Attachment::detected(
            "https://example.com/a.png".to_string(),
            "a.png".to_string(),
            "issue_body".to_string(),
        );
        downloaded.status = AttachmentStatus::Downloaded;

        let mut oversized = Attachment::detected(
            "https://example.com/big.bin".to_string(),
            "big.bin".to_string(),
            "issue_body".to_string(),
        );
        oversized.status = AttachmentStatus::SkippedOversized;

        let issue = Issue {
            number: 1,
            title: "t".to_string(),
            body: None,
            state: "open".to_string(),
            labels: vec![],
            user: User {
                login: "octocat".to_string(),
                id: 1,
            },
            comments: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            repository: "widgets".to_string(),
            attachments: vec![downloaded, oversized],
        };

        let mut result = CollectionResult::default();
        result.record_issue(&issue);

        assert_eq!(result.per_repository.get("widgets"), Some(&1));
        assert_eq!(result.attachments_downloaded, 1);
        assert_eq!(result.attachments_skipped, 1);
        assert!(result.is_complete());
    }
}
