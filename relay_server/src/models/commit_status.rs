//! GitHub commit status vocabulary.

use serde::Deserialize;

/// State of a commit status context. Compared for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitStatusState {
    Success,
    Failure,
    Pending,
    Error,
    Expected,
}

impl CommitStatusState {
    /// Lowercase form accepted by `POST /repos/{repo}/statuses/{sha}`.
    pub fn as_rest_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Pending => "pending",
            Self::Error => "error",
            // REST has no "expected"; it only appears on required checks.
            Self::Expected => "pending",
        }
    }
}

impl std::fmt::Display for CommitStatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Pending => "PENDING",
            Self::Error => "ERROR",
            Self::Expected => "EXPECTED",
        };
        f.write_str(name)
    }
}

/// A status write for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommitStatus {
    pub commit_id: String,
    pub state: CommitStatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}
