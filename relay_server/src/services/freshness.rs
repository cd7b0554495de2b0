//! Staleness check for pull requests.

use chrono::{DateTime, Duration, Utc};

use crate::config::STALE_AFTER_DAYS;
use crate::models::pull_request::PullRequest;

/// A PR is stale when its latest commit is more than 30 days old at `now`.
/// A PR with no known commit is treated as stale.
pub fn is_stale(pr: &PullRequest, now: DateTime<Utc>) -> bool {
    match pr.last_commit_at {
        Some(committed) => now - committed > Duration::days(STALE_AFTER_DAYS),
        None => true,
    }
}
