//! Open pull request snapshot as returned by the GitHub GraphQL API.

use chrono::{DateTime, Utc};

use super::commit_status::CommitStatusState;

/// One status context recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusContext {
    pub context: String,
    pub state: CommitStatusState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub url: String,
    /// Branch the pull request targets.
    pub base_branch: String,
    pub head_commit_id: String,
    /// `None` when GitHub returned no commits for the PR.
    pub last_commit_at: Option<DateTime<Utc>>,
    /// Statuses on the latest commit.
    pub latest_commit_statuses: Vec<StatusContext>,
}
