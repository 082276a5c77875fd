#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod attachments;
pub mod collector;
pub mod date_range;
pub mod exclusions;
pub mod models;
pub mod rate_limit;
pub mod request;
pub mod retry;
pub mod search;
pub mod storage;

pub use attachments::{
    detect_attachments, extract_filename, safe_filename, scan_issue, AttachmentDownloader,
    AttachmentError,
};
pub use collector::{
    CollectionResult, Collector, CollectorConfig, CollectorError, DEFAULT_DOWNLOAD_CONCURRENCY,
    DEFAULT_MAX_ATTACHMENT_SIZE_MB,
};
pub use date_range::{resolve_date_range, DateRange, DateRangeArgs, DateRangeError};
pub use exclusions::build_exclusion_list;
pub use models::{Attachment, AttachmentStatus, Comment, Issue, Label, StoredIssue, User};
pub use rate_limit::{
    check_core_rate_limit, check_search_rate_limit, ensure_core_rate_limit,
    ensure_search_rate_limit, wait_if_needed, wait_until_reset, RateLimitInfo,
};
pub use request::{
    CollectionMode, CollectionRequest, IssueStateFilter, RequestArgs, ValidationError,
};
pub use retry::{with_retry, IsTransient, RetryPolicy};
pub use search::{
    build_search_query, fetch_single_issue, search_organization_issues, search_repository_issues,
    RepositoryWarning, SearchError,
};
pub use storage::{StorageError, StorageManager, StorageStats};
