//! Collection request validation and mode selection.
//!
//! Raw caller parameters are validated exactly once, producing an immutable
//! [`CollectionRequest`] whose retrieval strategy is an explicit
//! [`CollectionMode`] variant rather than being re-derived from optional
//! fields at each use site. No network access happens here.

use crate::date_range::{resolve_date_range, DateRange, DateRangeArgs, DateRangeError};
use crate::exclusions::build_exclusion_list;
use std::str::FromStr;
use thiserror::Error;

/// Errors from bad or contradictory request parameters.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An issue number was supplied without a repository.
    #[error("issue-number requires a repository to be set")]
    IssueNumberWithoutRepository,

    /// A non-positive result limit was supplied.
    #[error("limit must be a positive integer")]
    ZeroLimit,

    /// An unrecognized state filter was supplied.
    #[error("unknown issue state '{value}', expected open, closed or all")]
    InvalidState { value: String },

    /// Contradictory or inverted date filters.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

/// Issue state filter for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueStateFilter {
    /// Only open issues.
    Open,
    /// Only closed issues.
    #[default]
    Closed,
    /// Issues in any state.
    All,
}

impl IssueStateFilter {
    /// The `state:` query value, or `None` for [`IssueStateFilter::All`].
    #[must_use]
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Self::Open => Some("open"),
            Self::Closed => Some("closed"),
            Self::All => None,
        }
    }
}

impl FromStr for IssueStateFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            _ => Err(ValidationError::InvalidState {
                value: value.to_string(),
            }),
        }
    }
}

/// Retrieval strategy, chosen once during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionMode {
    /// One direct fetch of a single issue.
    SingleIssue {
        /// Repository containing the issue.
        repository: String,
        /// Issue number to fetch.
        number: u64,
    },

    /// Paginated search scoped to one repository.
    Repository {
        /// Repository to search.
        repository: String,
    },

    /// Search across every repository visible in the organization.
    Organization {
        /// Repositories to skip.
        exclusions: Vec<String>,
    },
}

/// Raw caller parameters before validation.
#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    /// Organization name (required).
    pub org: String,
    /// Repository name; absent selects organization-wide mode.
    pub repo: Option<String>,
    /// Specific issue number; requires `repo`.
    pub issue_number: Option<u64>,
    /// Label filters.
    pub labels: Vec<String>,
    /// State filter.
    pub state: IssueStateFilter,
    /// Maximum number of issues to collect.
    pub limit: usize,
    /// Date filters.
    pub dates: DateRangeArgs,
    /// Repeated repository exclusions.
    pub exclude_repo: Vec<String>,
    /// Comma-separated repository exclusions.
    pub exclude_repos: Option<String>,
}

/// A validated, immutable collection request.
#[derive(Debug, Clone)]
pub struct CollectionRequest {
    org: String,
    labels: Vec<String>,
    state: IssueStateFilter,
    limit: usize,
    date_range: DateRange,
    mode: CollectionMode,
}

impl CollectionRequest {
    /// Validates raw parameters into a request.
    ///
    /// Mode selection: `SingleIssue` iff an issue number is present,
    /// `Organization` iff the repository is absent, `Repository` otherwise.
    /// Exclusions only apply in organization mode and are dropped for the
    /// other modes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an issue number without a repository,
    /// a zero limit, or contradictory date filters.
    pub fn validate(args: RequestArgs) -> Result<Self, ValidationError> {
        if args.limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }

        let date_range = resolve_date_range(&args.dates)?;

        let mode = match (args.repo, args.issue_number) {
            (Some(repository), Some(number)) => CollectionMode::SingleIssue { repository, number },
            (None, Some(_)) => return Err(ValidationError::IssueNumberWithoutRepository),
            (Some(repository), None) => CollectionMode::Repository { repository },
            (None, None) => CollectionMode::Organization {
                exclusions: build_exclusion_list(
                    &args.exclude_repo,
                    args.exclude_repos.as_deref(),
                ),
            },
        };

        Ok(Self {
            org: args.org,
            labels: args.labels,
            state: args.state,
            limit: args.limit,
            date_range,
            mode,
        })
    }

    /// Organization the collection targets.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Label filters.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// State filter.
    pub fn state(&self) -> IssueStateFilter {
        self.state
    }

    /// Ceiling on the total number of collected issues.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Resolved date range.
    pub fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    /// Retrieval strategy.
    pub fn mode(&self) -> &CollectionMode {
        &self.mode
    }
}
