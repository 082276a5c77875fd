//! Attachment detection and download.
//!
//! Scans collected issues for attachment references and materializes them on
//! disk under a size ceiling. Downloads run with bounded parallelism: one
//! semaphore caps total in-flight transfers across the whole collection
//! operation. Every failure is recorded on the attachment itself; nothing in
//! this module aborts issue persistence.

mod detect;
mod error;

pub use detect::{detect_attachments, extract_filename, safe_filename, scan_issue};
pub use error::AttachmentError;

use crate::models::{Attachment, AttachmentStatus, Issue};
use crate::retry::{with_retry, RetryPolicy};
use futures::stream::{self, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

/// Declared size and content type learned from a HEAD probe.
struct Probe {
    size: Option<u64>,
    content_type: Option<String>,
}

/// Downloads issue attachments with a size ceiling and bounded concurrency.
pub struct AttachmentDownloader {
    client: reqwest::Client,
    token: String,
    max_size_bytes: u64,
    concurrency: usize,
    policy: RetryPolicy,
    limiter: Arc<Semaphore>,
}

impl AttachmentDownloader {
    /// Creates a downloader.
    ///
    /// `max_size_mb` is the per-attachment ceiling; `concurrency` caps
    /// simultaneous transfers across all issues of one collection run.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] if the HTTP client cannot be built.
    pub fn new(
        token: String,
        max_size_mb: u64,
        concurrency: usize,
        policy: RetryPolicy,
    ) -> Result<Self, AttachmentError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("issue-harvester/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token,
            max_size_bytes: max_size_mb * 1024 * 1024,
            concurrency: concurrency.max(1),
            policy,
            limiter: Arc::new(Semaphore::new(concurrency.max(1))),
        })
    }

    /// Detects and downloads all attachments for one issue.
    ///
    /// Detection replaces the issue's attachment list; each entry is then
    /// driven to a terminal status. The issue directory is namespaced as
    /// `<base>/<org>/<repository>/<issue-number>/`. The call returns only
    /// once every attachment has settled.
    pub async fn ingest_issue(&self, issue: &mut Issue, base_dir: &Path, org: &str) {
        scan_issue(issue);
        if issue.attachments.is_empty() {
            return;
        }

        let span = info_span!(
            "ingest_attachments",
            org,
            repo = issue.repository.as_str(),
            number = issue.number,
            count = issue.attachments.len()
        );

        async {
            let dir = base_dir
                .join(org)
                .join(&issue.repository)
                .join(issue.number.to_string());

            if let Err(e) = std::fs::create_dir_all(&dir) {
                warn!(error = %e, "Could not create attachment directory");
                let reason = format!("could not create attachment directory: {e}");
                for attachment in &mut issue.attachments {
                    attachment.status = AttachmentStatus::Failed {
                        reason: reason.clone(),
                    };
                }
                return;
            }

            let pending = std::mem::take(&mut issue.attachments);
            // buffered (not buffer_unordered) keeps detection order in the
            // stored record even though transfers complete in any order.
            issue.attachments = stream::iter(
                pending
                    .into_iter()
                    .map(|attachment| self.download_one(attachment, &dir)),
            )
            .buffered(self.concurrency)
            .collect()
            .await;

            let downloaded = issue
                .attachments
                .iter()
                .filter(|a| a.status == AttachmentStatus::Downloaded)
                .count();
            info!(
                downloaded,
                total = issue.attachments.len(),
                "Attachment ingestion complete"
            );
        }
        .instrument(span)
        .await;
    }

    /// Drives one attachment to a terminal status.
    async fn download_one(&self, mut attachment: Attachment, dir: &Path) -> Attachment {
        let permit = self.limiter.acquire().await;
        if permit.is_err() {
            attachment.status = AttachmentStatus::Failed {
                reason: "download limiter closed".to_string(),
            };
            return attachment;
        }

        // Cheap size gate before committing to a transfer.
        if let Some(probe) = self.probe(&attachment.original_url).await {
            if let Some(declared) = probe.size {
                attachment.size = Some(declared);
                if declared > self.max_size_bytes {
                    debug!(
                        url = %attachment.original_url,
                        declared,
                        max = self.max_size_bytes,
                        "Skipping oversized attachment"
                    );
                    attachment.status = AttachmentStatus::SkippedOversized;
                    return attachment;
                }
            }
            if probe.content_type.is_some() {
                attachment.content_type = probe.content_type;
            }
        }

        let url = attachment.original_url.clone();
        match with_retry(&self.policy, || self.fetch_to_temp(&url, dir)).await {
            Ok((temp, written, content_type)) => {
                let filename = safe_filename(&attachment.filename, dir);
                let path = dir.join(&filename);
                match temp.persist(&path) {
                    Ok(_) => {
                        debug!(path = %path.display(), bytes = written, "Attachment downloaded");
                        attachment.size = Some(written);
                        if content_type.is_some() {
                            attachment.content_type = content_type;
                        }
                        attachment.local_path = Some(path.display().to_string());
                        attachment.status = AttachmentStatus::Downloaded;
                    }
                    Err(e) => {
                        warn!(error = %e.error, "Could not persist attachment");
                        attachment.status = AttachmentStatus::Failed {
                            reason: format!("could not persist downloaded file: {}", e.error),
                        };
                    }
                }
            }
            Err(AttachmentError::TooLarge { size, .. }) => {
                debug!(
                    url = %attachment.original_url,
                    observed = size,
                    "Aborted oversized transfer"
                );
                attachment.size = Some(size);
                attachment.status = AttachmentStatus::SkippedOversized;
            }
            Err(e) => {
                warn!(url = %attachment.original_url, error = %e, "Attachment download failed");
                attachment.status = AttachmentStatus::Failed {
                    reason: e.to_string(),
                };
            }
        }

        attachment
    }

    /// Best-effort HEAD probe for declared size and content type.
    async fn probe(&self, url: &str) -> Option<Probe> {
        let response = self
            .client
            .head(url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .send()
            .await
            .ok()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        Some(Probe {
            size: response.content_length(),
            content_type,
        })
    }

    /// Streams the attachment into a temp file in the target directory.
    ///
    /// The transfer aborts as soon as the byte count passes the ceiling;
    /// dropping the temp file discards the partial bytes, so a failed or
    /// aborted download never leaves a truncated file at the final path.
    async fn fetch_to_temp(
        &self,
        url: &str,
        dir: &Path,
    ) -> Result<(NamedTempFile, u64, Option<String>), AttachmentError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .send()
            .await?
            .error_for_status()?;

        if let Some(declared) = response.content_length() {
            if declared > self.max_size_bytes {
                return Err(AttachmentError::TooLarge {
                    size: declared,
                    max: self.max_size_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let mut temp = NamedTempFile::new_in(dir)?;
        let mut written: u64 = 0;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_size_bytes {
                return Err(AttachmentError::TooLarge {
                    size: written,
                    max: self.max_size_bytes,
                });
            }
            temp.write_all(&chunk)?;
        }

        Ok((temp, written, content_type))
    }
}
