//! Collector configuration.

use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};

/// Default attachment size ceiling in megabytes.
pub const DEFAULT_MAX_ATTACHMENT_SIZE_MB: u64 = 10;

/// Default ceiling on simultaneous attachment downloads.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 4;

/// Configuration for a [`Collector`][crate::Collector].
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Root directory of the local store.
    data_dir: PathBuf,
    /// GitHub token used for API calls and attachment downloads.
    token: String,
    /// Whether to download detected attachments.
    download_attachments: bool,
    /// Per-attachment size ceiling in megabytes.
    max_attachment_size_mb: u64,
    /// Ceiling on simultaneous attachment downloads.
    concurrency: usize,
    /// Retry policy applied to search and download operations.
    retry: RetryPolicy,
}

impl CollectorConfig {
    /// Creates a configuration with default attachment handling.
    pub fn new(data_dir: PathBuf, token: String) -> Self {
        Self {
            data_dir,
            token,
            download_attachments: true,
            max_attachment_size_mb: DEFAULT_MAX_ATTACHMENT_SIZE_MB,
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }

    /// Disables or enables attachment downloads.
    #[must_use]
    pub fn with_download_attachments(mut self, enabled: bool) -> Self {
        self.download_attachments = enabled;
        self
    }

    /// Sets the per-attachment size ceiling in megabytes.
    #[must_use]
    pub fn with_max_attachment_size_mb(mut self, megabytes: u64) -> Self {
        self.max_attachment_size_mb = megabytes;
        self
    }

    /// Sets the download concurrency ceiling.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets a custom retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Root directory of the local store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether attachment downloads are enabled.
    pub fn download_attachments(&self) -> bool {
        self.download_attachments
    }

    /// Per-attachment size ceiling in megabytes.
    pub fn max_attachment_size_mb(&self) -> u64 {
        self.max_attachment_size_mb
    }

    /// Download concurrency ceiling.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Retry policy for remote operations.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}
