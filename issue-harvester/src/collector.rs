//! Orchestrates issue collection runs.
//!
//! A [`Collector`] ties the pieces together: it dispatches retrieval on the
//! request's collection mode, enriches the collected issues with downloaded
//! attachments, persists everything through the store, and reports the
//! outcome with per-repository tallies and any skipped-repository warnings.

mod config;
mod error;
mod result;

pub use config::{CollectorConfig, DEFAULT_DOWNLOAD_CONCURRENCY, DEFAULT_MAX_ATTACHMENT_SIZE_MB};
pub use error::CollectorError;
pub use result::CollectionResult;

use crate::attachments::AttachmentDownloader;
use crate::models::Issue;
use crate::request::{CollectionMode, CollectionRequest};
use crate::search::{
    fetch_single_issue, search_organization_issues, search_repository_issues, RepositoryWarning,
};
use crate::storage::{StorageManager, StorageStats};
use octocrab::Octocrab;
use tracing::{info, info_span, Instrument};

/// Runs collection requests end to end: retrieval, attachment ingestion,
/// and persistence.
pub struct Collector {
    config: CollectorConfig,
    octocrab: Octocrab,
    storage: StorageManager,
}

impl Collector {
    /// Builds a collector from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] if the GitHub client cannot be built.
    pub fn new(config: CollectorConfig) -> Result<Self, CollectorError> {
        let octocrab = Octocrab::builder()
            .personal_token(config.token().to_string())
            .build()?;
        let storage = StorageManager::new(config.data_dir());
        Ok(Self {
            config,
            octocrab,
            storage,
        })
    }

    /// Executes one collection run.
    ///
    /// Retrieval errors are fatal; attachment failures are recorded on the
    /// attachments and never abort the run. In organization mode a failing
    /// repository becomes a warning in the result and the sweep continues.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] on retrieval or persistence failure.
    pub async fn collect(
        &self,
        request: &CollectionRequest,
    ) -> Result<CollectionResult, CollectorError> {
        let span = info_span!("collect", org = request.org());

        async move {
            let (mut issues, warnings) = self.retrieve(request).await?;
            info!(count = issues.len(), "Retrieved issues");

            if self.config.download_attachments() {
                self.ingest_attachments(&mut issues, request.org()).await?;
            }

            let mut result = CollectionResult {
                warnings,
                ..CollectionResult::default()
            };
            for issue in &issues {
                result.record_issue(issue);
            }

            result.total_saved = issues.len();
            result.saved_paths = self.storage.save_issues(request.org(), issues)?;
            result.storage = self.storage.stats()?;

            info!(
                saved = result.total_saved,
                downloaded = result.attachments_downloaded,
                skipped_repositories = result.warnings.len(),
                "Collection run complete"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Dispatches retrieval on the request's collection mode.
    async fn retrieve(
        &self,
        request: &CollectionRequest,
    ) -> Result<(Vec<Issue>, Vec<RepositoryWarning>), CollectorError> {
        let policy = self.config.retry();

        match request.mode() {
            CollectionMode::SingleIssue { repository, number } => {
                let issue = fetch_single_issue(
                    &self.octocrab,
                    policy,
                    request.org(),
                    repository,
                    *number,
                )
                .await?;
                Ok((vec![issue], Vec::new()))
            }
            CollectionMode::Repository { repository } => {
                let issues = search_repository_issues(
                    &self.octocrab,
                    policy,
                    request,
                    repository,
                    request.limit(),
                )
                .await?;
                Ok((issues, Vec::new()))
            }
            CollectionMode::Organization { .. } => {
                let (issues, warnings) =
                    search_organization_issues(&self.octocrab, policy, request).await?;
                Ok((issues, warnings))
            }
        }
    }

    /// Drives every issue's attachments to a terminal status.
    ///
    /// Issues are processed in order; the downloader's internal semaphore
    /// bounds parallel transfers within each issue.
    async fn ingest_attachments(
        &self,
        issues: &mut [Issue],
        org: &str,
    ) -> Result<(), CollectorError> {
        let downloader = AttachmentDownloader::new(
            self.config.token().to_string(),
            self.config.max_attachment_size_mb(),
            self.config.concurrency(),
            self.config.retry().clone(),
        )?;

        let base = self.storage.attachments_dir();
        for issue in issues {
            downloader.ingest_issue(issue, &base, org).await;
        }
        Ok(())
    }

    /// Computes statistics for the local store backing this collector.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] if the store cannot be read.
    pub fn storage_stats(&self) -> Result<StorageStats, CollectorError> {
        Ok(self.storage.stats()?)
    }
}
