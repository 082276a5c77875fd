//! Rate limiting utilities for the GitHub API.
//!
//! Search and core API calls check remaining quota proactively and wait for
//! the reset when it runs low; the search layer additionally waits
//! reactively when the API signals exhaustion mid-pagination.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for a rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for one API resource.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the window resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

/// Fetches the current search API rate limit status.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_search_rate_limit(
    octocrab: &Octocrab,
) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let search = &rate_limit.resources.search;

    Ok(RateLimitInfo {
        remaining: search.remaining as u32,
        reset: search.reset,
        limit: search.limit as u32,
    })
}

/// Fetches the current core API rate limit status (issues, comments,
/// repository listings).
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

/// Waits for the reset if remaining quota is low, returning true if a wait
/// happened.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }

    let now = unix_now();
    if info.reset <= now {
        return false;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Sleeps until the given reset timestamp has elapsed.
///
/// Used when the API reports exhaustion mid-operation so the in-flight
/// strategy can resume afterwards instead of restarting.
pub async fn wait_until_reset(reset: u64) {
    let now = unix_now();
    if reset <= now {
        return;
    }

    let wait_secs = (reset - now + 1).min(MAX_WAIT_SECS);
    info!(wait_secs, "Rate limit exhausted, waiting for reset");
    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
}

/// Ensures sufficient search API quota before a search call.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_search_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_search_rate_limit(octocrab).await?;
    wait_if_needed(&info).await;
    Ok(())
}

/// Ensures sufficient core API quota before a core call.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_core_rate_limit(octocrab).await?;
    wait_if_needed(&info).await;
    Ok(())
}

/// Current Unix timestamp in seconds.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn high_remaining_does_not_wait() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: unix_now() + 600,
            limit: 1000,
        };

        assert!(!wait_if_needed(&info).await);
    }

    #[tokio::test]
    async fn elapsed_reset_does_not_wait() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 0,
            limit: 30,
        };

        assert!(!wait_if_needed(&info).await);
    }

    #[tokio::test]
    async fn wait_until_elapsed_reset_returns_immediately() {
        // A reset in the past must not sleep at all.
        let start = std::time::Instant::now();
        wait_until_reset(0).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
