//! Top-level collection error type.

use crate::attachments::AttachmentError;
use crate::request::ValidationError;
use crate::search::SearchError;
use crate::storage::StorageError;

/// Errors that can abort a whole collection operation.
///
/// Attachment-level failures never surface here; they are recorded on the
/// attachments themselves. Repository-level failures in organization mode
/// become warnings in the result instead of errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Bad or contradictory request parameters.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Retrieval failure (auth, not found, or exhausted retries).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Local store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// GitHub API client initialization failure.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Attachment downloader initialization failure.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
