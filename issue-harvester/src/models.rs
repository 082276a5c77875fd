//! Core data model for collected issues.
//!
//! Loosely-typed GitHub API responses are converted into these strongly-typed
//! records at the ingestion boundary; everything downstream of the search
//! layer works with these types only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub login: String,
    /// Numeric account id.
    pub id: u64,
}

/// An issue label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Hex color without leading `#`.
    pub color: String,
    /// Optional label description.
    pub description: Option<String>,
}

/// A single issue comment.
///
/// Immutable once fetched; comments are kept in the chronological order
/// returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment id, unique per repository.
    pub id: u64,
    /// Comment author.
    pub user: User,
    /// Comment body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Terminal and non-terminal states of an attachment download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttachmentStatus {
    /// Detected but not yet downloaded.
    Pending,

    /// Downloaded and persisted locally.
    Downloaded,

    /// Declared or observed size exceeded the configured ceiling.
    SkippedOversized,

    /// Download failed after retries were exhausted.
    Failed {
        /// Last error observed.
        reason: String,
    },
}

impl AttachmentStatus {
    /// Returns true once the download has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A binary attachment referenced from an issue body or comment.
///
/// Created during the detection scan with status [`AttachmentStatus::Pending`]
/// and mutated only by the download step. A failed attachment stays on the
/// issue with its failure reason; it is never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Remote URL the attachment was detected at.
    pub original_url: String,
    /// Filename extracted from the URL.
    pub filename: String,
    /// Where the reference was found: `issue_body` or `comment_<id>`.
    pub source: String,
    /// Byte size, declared by the server or observed during download.
    pub size: Option<u64>,
    /// Content type reported by the server.
    pub content_type: Option<String>,
    /// Local path once downloaded.
    pub local_path: Option<String>,
    /// Download status.
    pub status: AttachmentStatus,
}

impl Attachment {
    /// Creates a freshly detected attachment in the pending state.
    #[must_use]
    pub fn detected(original_url: String, filename: String, source: String) -> Self {
        Self {
            original_url,
            filename,
            source,
            size: None,
            content_type: None,
            local_path: None,
            status: AttachmentStatus::Pending,
        }
    }
}

/// A collected issue with its comments and attachments.
///
/// Identity key: (organization, repository, number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number, unique within its repository.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body, absent for empty issues.
    pub body: Option<String>,
    /// Issue state (`open` or `closed`).
    pub state: String,
    /// Labels attached to the issue.
    pub labels: Vec<Label>,
    /// Issue author.
    pub user: User,
    /// Comments in chronological order.
    pub comments: Vec<Comment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Close timestamp, if closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Repository the issue belongs to. Always denormalized onto the issue
    /// so organization-wide results can be grouped without outside context.
    pub repository: String,
    /// Attachments detected in the body and comments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Issue {
    /// Returns true once every attachment has reached a terminal status.
    #[must_use]
    pub fn attachments_settled(&self) -> bool {
        self.attachments.iter().all(|a| a.status.is_terminal())
    }
}

/// The durable record persisted for one issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIssue {
    /// Organization the issue was collected from.
    pub org: String,
    /// Repository the issue was collected from.
    pub repo: String,
    /// The collected issue.
    pub issue: Issue,
    /// When this record was written.
    pub collected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issue(attachments: Vec<Attachment>) -> Issue {
        Issue {
            number: 42,
            title: "test".to_string(),
            body: None,
            state: "closed".to_string(),
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
            attachments,
        }
    }

    #[test]
    fn detected_attachment_is_pending() {
        let attachment = Attachment::detected(
            "https://example.com/log.txt".to_string(),
            "log.txt".to_string(),
            "issue_body".to_string(),
        );

        assert_eq!(attachment.status, AttachmentStatus::Pending);
        assert!(!attachment.status.is_terminal());
        assert!(attachment.local_path.is_none());
    }

    #[test]
    fn failed_status_is_terminal() {
        let status = AttachmentStatus::Failed {
            reason: "connection reset".to_string(),
        };
        assert!(status.is_terminal());
        assert!(AttachmentStatus::Downloaded.is_terminal());
        assert!(AttachmentStatus::SkippedOversized.is_terminal());
    }

    #[test]
    fn issue_with_no_attachments_is_settled() {
        assert!(test_issue(vec![]).attachments_settled());
    }

    #[test]
    fn issue_with_pending_attachment_is_not_settled() {
        let pending = Attachment::detected(
            "https://example.com/a.png".to_string(),
            "a.png".to_string(),
            "comment_7".to_string(),
        );
        assert!(!test_issue(vec![pending]).attachments_settled());
    }

    #[test]
    fn stored_issue_round_trips_through_json() {
        let stored = StoredIssue {
            org: "acme".to_string(),
            repo: "widgets".to_string(),
            issue: test_issue(vec![]),
            collected_at: Utc::now(),
        };

        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredIssue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.issue.number, 42);
        assert_eq!(back.repo, "widgets");
    }
}
