//! Attachment download error types.

use crate::retry::IsTransient;
use thiserror::Error;

/// Errors from downloading a single attachment.
///
/// These are always recorded on the attachment itself and never abort the
/// owning issue's persistence.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Declared or observed size exceeded the configured ceiling.
    #[error("attachment exceeds the size ceiling ({size} > {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// HTTP transfer failure.
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// Local filesystem failure while spooling or persisting the bytes.
    #[error("failed to write attachment: {0}")]
    Io(#[from] std::io::Error),
}

impl IsTransient for AttachmentError {
    fn is_transient(&self) -> bool {
        match self {
            Self::TooLarge { .. } => false,
            Self::Download(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|status| status.is_server_error())
            }
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
        }
    }
}
