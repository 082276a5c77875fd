//! Issue retrieval strategies against the GitHub API.
//!
//! Implements the three collection strategies: a direct single-issue fetch,
//! a paginated repository-scoped search, and an organization-wide sweep that
//! applies the repository strategy to every visible repository not in the
//! exclusion set. Rate limit exhaustion suspends the in-flight strategy until
//! the reset and resumes from the last consumed page; transient failures go
//! through the shared retry policy.

mod error;
mod query;

pub use error::SearchError;
pub use query::build_search_query;

use crate::models::{Comment, Issue, Label, User};
use crate::rate_limit::{
    check_core_rate_limit, check_search_rate_limit, ensure_core_rate_limit,
    ensure_search_rate_limit, unix_now, wait_until_reset,
};
use crate::request::{CollectionMode, CollectionRequest};
use crate::retry::{with_retry, RetryPolicy};
use error::status_code;
use octocrab::models::IssueState;
use octocrab::Octocrab;
use std::future::Future;
use tracing::{debug, info, info_span, warn, Instrument};

/// Results per page for search and listing calls.
const RESULTS_PER_PAGE: u8 = 100;

/// Ceiling on wait-and-resume cycles within one API call.
const MAX_RATE_LIMIT_RECOVERIES: u32 = 3;

/// Fallback wait when the reset timestamp cannot be fetched.
const FALLBACK_RESET_SECS: u64 = 60;

/// A repository skipped during an organization-wide sweep, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RepositoryWarning {
    /// Repository name.
    pub repository: String,
    /// Why it was skipped.
    pub reason: String,
}

#[derive(Clone, Copy)]
enum RateResource {
    Search,
    Core,
}

/// Fetches one issue directly by number.
///
/// # Errors
///
/// Returns [`SearchError::NotFound`] if the issue is absent,
/// [`SearchError::Auth`] if the credential is rejected, and
/// [`SearchError::RetriesExhausted`] when transient failures persist.
pub async fn fetch_single_issue(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    org: &str,
    repo: &str,
    number: u64,
) -> Result<Issue, SearchError> {
    let span = info_span!("single_issue", org, repo, number);

    async move {
        ensure_core_rate_limit(octocrab).await?;

        let raw = call_with_recovery(octocrab, policy, RateResource::Core, || async move {
            octocrab.issues(org, repo).get(number).await
        })
        .await
        .map_err(|e| match status_code(&e) {
            Some(404) => SearchError::NotFound {
                org: org.to_string(),
                repo: repo.to_string(),
                number,
            },
            _ => SearchError::from_api_error(e),
        })?;

        let comments = fetch_issue_comments(octocrab, policy, org, repo, number).await;
        info!(comment_count = comments.len(), "Fetched single issue");
        Ok(convert_issue(raw, repo, comments))
    }
    .instrument(span)
    .await
}

/// Searches one repository for issues matching the request filters.
///
/// Paginates until `limit` issues are collected or the API signals no
/// further pages; an overshooting last page is truncated to exactly `limit`.
/// Issues keep the source's native order.
///
/// # Errors
///
/// Returns [`SearchError`] if the search fails past recovery.
pub async fn search_repository_issues(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    request: &CollectionRequest,
    repository: &str,
    limit: usize,
) -> Result<Vec<Issue>, SearchError> {
    let span = info_span!("repository_search", org = request.org(), repo = repository);

    async move {
        let query = build_search_query(
            request.org(),
            repository,
            request.labels(),
            request.state(),
            request.date_range(),
        );
        debug!(query = %query, "Executing issue search");

        let mut issues: Vec<Issue> = Vec::new();
        let mut page_num: u32 = 1;

        loop {
            ensure_search_rate_limit(octocrab).await?;

            let page = call_with_recovery(octocrab, policy, RateResource::Search, || {
                octocrab
                    .search()
                    .issues_and_pull_requests(&query)
                    .per_page(RESULTS_PER_PAGE)
                    .page(page_num)
                    .send()
            })
            .await
            .map_err(SearchError::from_api_error)?;

            let has_next = page.next.is_some();

            for raw in page.items {
                if issues.len() >= limit {
                    break;
                }
                let comments =
                    fetch_issue_comments(octocrab, policy, request.org(), repository, raw.number)
                        .await;
                issues.push(convert_issue(raw, repository, comments));
            }

            if issues.len() >= limit || !has_next {
                break;
            }
            page_num += 1;
        }

        issues.truncate(limit);
        info!(count = issues.len(), "Repository search complete");
        Ok(issues)
    }
    .instrument(span)
    .await
}

/// Searches every repository visible in the organization, skipping the
/// exclusion set.
///
/// Repositories are processed in the order returned by the listing call.
/// `limit` is a ceiling on the combined total. A repository whose search
/// fails past recovery is recorded as a warning and the sweep continues;
/// only authentication failures abort the whole sweep.
///
/// # Errors
///
/// Returns [`SearchError::Auth`] on credential rejection, or the listing
/// failure if the organization's repositories cannot be enumerated.
pub async fn search_organization_issues(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    request: &CollectionRequest,
) -> Result<(Vec<Issue>, Vec<RepositoryWarning>), SearchError> {
    let exclusions: &[String] = match request.mode() {
        CollectionMode::Organization { exclusions } => exclusions,
        _ => &[],
    };

    let span = info_span!("organization_search", org = request.org());

    async move {
        let repositories = list_organization_repositories(octocrab, policy, request.org())
            .await
            .map_err(SearchError::from_api_error)?;
        info!(
            count = repositories.len(),
            "Listed organization repositories"
        );

        let mut issues: Vec<Issue> = Vec::new();
        let mut warnings: Vec<RepositoryWarning> = Vec::new();

        for repository in repositories {
            if issues.len() >= request.limit() {
                break;
            }
            if exclusions.iter().any(|excluded| *excluded == repository) {
                debug!(repo = %repository, "Skipping excluded repository");
                continue;
            }

            let remaining = request.limit() - issues.len();
            match search_repository_issues(octocrab, policy, request, &repository, remaining).await
            {
                Ok(found) => issues.extend(found),
                Err(SearchError::Auth) => return Err(SearchError::Auth),
                Err(e) => {
                    warn!(repo = %repository, error = %e, "Skipping repository after search failure");
                    warnings.push(RepositoryWarning {
                        repository,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            count = issues.len(),
            skipped = warnings.len(),
            "Organization search complete"
        );
        Ok((issues, warnings))
    }
    .instrument(span)
    .await
}

/// Lists repository names in the organization, in API order.
async fn list_organization_repositories(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    org: &str,
) -> Result<Vec<String>, octocrab::Error> {
    ensure_core_rate_limit(octocrab).await?;

    let mut names = Vec::new();
    let mut page = call_with_recovery(octocrab, policy, RateResource::Core, || async move {
        octocrab
            .orgs(org)
            .list_repos()
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await
    })
    .await?;

    loop {
        names.extend(page.items.iter().map(|repo| repo.name.clone()));
        let next = page.next.clone();
        match call_with_recovery(octocrab, policy, RateResource::Core, || {
            octocrab.get_page::<octocrab::models::Repository>(&next)
        })
        .await?
        {
            Some(next_page) => page = next_page,
            None => break,
        }
    }

    Ok(names)
}

/// Fetches all comments for an issue in source order.
///
/// A comment fetch failure degrades with a warning so a single bad issue
/// does not abort a sweep; pages consumed before the failure are kept.
async fn fetch_issue_comments(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    org: &str,
    repo: &str,
    number: u64,
) -> Vec<Comment> {
    let mut comments = Vec::new();
    if let Err(e) = fetch_comment_pages(octocrab, policy, org, repo, number, &mut comments).await {
        warn!(
            org,
            repo,
            number,
            fetched = comments.len(),
            error = %e,
            "Comment fetch interrupted, keeping pages already fetched"
        );
    }
    comments
}

async fn fetch_comment_pages(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    org: &str,
    repo: &str,
    number: u64,
    comments: &mut Vec<Comment>,
) -> Result<(), octocrab::Error> {
    let mut page = call_with_recovery(octocrab, policy, RateResource::Core, || async move {
        octocrab
            .issues(org, repo)
            .list_comments(number)
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await
    })
    .await?;

    loop {
        comments.extend(page.items.iter().map(convert_comment));
        let next = page.next.clone();
        match call_with_recovery(octocrab, policy, RateResource::Core, || {
            octocrab.get_page::<octocrab::models::issues::Comment>(&next)
        })
        .await?
        {
            Some(next_page) => page = next_page,
            None => break,
        }
    }

    Ok(())
}

/// Runs one API call under the retry policy, recovering from rate limit
/// exhaustion by waiting for the reset and retrying the same call.
///
/// Resuming the same call (rather than restarting the surrounding strategy)
/// is what preserves pagination position across a rate limit pause.
async fn call_with_recovery<T, F, Fut>(
    octocrab: &Octocrab,
    policy: &RetryPolicy,
    resource: RateResource,
    mut operation: F,
) -> Result<T, octocrab::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, octocrab::Error>>,
{
    let mut recoveries = 0;
    loop {
        match with_retry(policy, || operation()).await {
            Ok(value) => return Ok(value),
            Err(e) if error::is_rate_limited(&e) && recoveries < MAX_RATE_LIMIT_RECOVERIES => {
                recoveries += 1;
                let reset = match resource {
                    RateResource::Search => check_search_rate_limit(octocrab).await,
                    RateResource::Core => check_core_rate_limit(octocrab).await,
                }
                .map(|info| info.reset)
                .unwrap_or_else(|_| unix_now() + FALLBACK_RESET_SECS);
                wait_until_reset(reset).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Converts an API issue into the collected record shape.
///
/// The repository name comes from the search context rather than being
/// re-parsed out of the issue's repository URL.
fn convert_issue(
    raw: octocrab::models::issues::Issue,
    repository: &str,
    comments: Vec<Comment>,
) -> Issue {
    Issue {
        number: raw.number,
        title: raw.title,
        body: raw.body,
        state: convert_state(&raw.state),
        labels: raw
            .labels
            .into_iter()
            .map(|label| Label {
                name: label.name,
                color: label.color,
                description: label.description,
            })
            .collect(),
        user: User {
            login: raw.user.login,
            id: raw.user.id.0,
        },
        comments,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        closed_at: raw.closed_at,
        repository: repository.to_string(),
        attachments: Vec::new(),
    }
}

fn convert_comment(raw: &octocrab::models::issues::Comment) -> Comment {
    Comment {
        id: raw.id.0,
        user: User {
            login: raw.user.login.clone(),
            id: raw.user.id.0,
        },
        body: raw.body.clone().unwrap_or_default(),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    }
}

fn convert_state(state: &IssueState) -> String {
    match state {
        IssueState::Closed => "closed".to_string(),
        _ => "open".to_string(),
    }
}
