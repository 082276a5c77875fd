//! Search error types and GitHub error classification.

use crate::retry::IsTransient;
use thiserror::Error;

/// Errors that can occur while retrieving issues.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The credential was missing or rejected.
    #[error("Authentication failed: GitHub rejected the credential")]
    Auth,

    /// The requested issue does not exist or is not visible.
    #[error("Issue {org}/{repo}#{number} was not found")]
    NotFound {
        org: String,
        repo: String,
        number: u64,
    },

    /// Transient failures persisted past the retry ceiling.
    #[error("Retries exhausted: {source}")]
    RetriesExhausted {
        #[source]
        source: octocrab::Error,
    },

    /// Any other GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),
}

impl SearchError {
    /// Classifies a fetch failure, distinguishing auth failures and retry
    /// exhaustion from other API errors.
    pub(crate) fn from_api_error(error: octocrab::Error) -> Self {
        match status_code(&error) {
            Some(401) => Self::Auth,
            _ if error.is_transient() => Self::RetriesExhausted { source: error },
            _ => Self::GitHub(error),
        }
    }
}

/// HTTP status carried by a GitHub API error, if any.
pub(crate) fn status_code(error: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = error {
        Some(source.status_code.as_u16())
    } else {
        None
    }
}

/// True when the API signaled rate limit exhaustion.
///
/// GitHub reports this as a 403 whose message names the rate limit, which
/// is distinct from an ordinary permission failure.
pub(crate) fn is_rate_limited(error: &octocrab::Error) -> bool {
    if let octocrab::Error::GitHub { source, .. } = error {
        (source.status_code.as_u16() == 403 || source.status_code.as_u16() == 429)
            && source.message.to_lowercase().contains("rate limit")
    } else {
        false
    }
}

impl IsTransient for octocrab::Error {
    fn is_transient(&self) -> bool {
        match self {
            // 5xx responses are server-side and worth retrying; rate limit
            // signals are recovered separately via wait-and-resume.
            octocrab::Error::GitHub { source, .. } => {
                source.status_code.is_server_error() && !is_rate_limited(self)
            }
            // Connection-level failures (timeouts, resets).
            octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. } => true,
            _ => false,
        }
    }
}
