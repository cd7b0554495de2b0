//! Keeps the CI status of open pull requests in line with the latest
//! Ready for Nightly outcome on `master` and `release`.
//!
//! Every notification triggers a full recomputation from fresh TeamCity and
//! GitHub snapshots. Nothing is remembered between notifications, so
//! duplicated or reordered deliveries at most repeat a write that is then
//! skipped as already reflected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{CI_STATUS_CONTEXT, DEFAULT_GATING_BUILD_LABEL, TRACKED_BRANCHES};
use crate::error::ClientError;
use crate::models::build::Build;
use crate::models::commit_status::{CommitStatusState, NewCommitStatus};
use crate::models::notification::{BuildEventStatus, BuildNotification};
use crate::models::pull_request::PullRequest;
use crate::services::freshness;
use crate::services::github_service::SourceHost;
use crate::services::status_mapper::{self, UnmappedBuildStatus};
use crate::services::teamcity_service::BuildSystem;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch build {build_id}: {source}")]
    BuildLookup {
        build_id: String,
        #[source]
        source: ClientError,
    },

    #[error("build {0} not found in TeamCity")]
    BuildNotFound(String),

    #[error("failed to list open pull requests of {repo}: {source}")]
    PullRequestListing {
        repo: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    UnmappedStatus(#[from] UnmappedBuildStatus),
}

/// Why a notification did not lead to any pull request evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFinished(BuildEventStatus),
    OtherBuildType(String),
    UntrackedBranch(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinished(status) => write!(f, "build is {status}"),
            Self::OtherBuildType(build_type) => write!(f, "build type {build_type} is not gated"),
            Self::UntrackedBranch(branch) => write!(f, "branch {branch:?} is not tracked"),
        }
    }
}

/// Per pull request tally of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub examined: usize,
    pub stale: usize,
    pub up_to_date: usize,
    pub other_branch: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Synchronized(SyncReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrDecision {
    Stale,
    UpToDate,
    OtherBranch,
    Update,
}

pub struct CiStatusSynchronizer {
    github: Arc<dyn SourceHost>,
    teamcity: Arc<dyn BuildSystem>,
    repo: String,
    gating_build_type_id: String,
    gating_build_label: String,
}

impl CiStatusSynchronizer {
    pub fn new(
        github: Arc<dyn SourceHost>,
        teamcity: Arc<dyn BuildSystem>,
        repo: impl Into<String>,
        gating_build_type_id: impl Into<String>,
    ) -> Self {
        Self {
            github,
            teamcity,
            repo: repo.into(),
            gating_build_type_id: gating_build_type_id.into(),
            gating_build_label: DEFAULT_GATING_BUILD_LABEL.to_string(),
        }
    }

    /// Name the gating build differently in status descriptions.
    pub fn with_gating_label(mut self, label: impl Into<String>) -> Self {
        self.gating_build_label = label.into();
        self
    }

    pub async fn on_build_finished(
        &self,
        notification: &BuildNotification,
    ) -> Result<SyncOutcome, SyncError> {
        self.on_build_finished_at(notification, Utc::now()).await
    }

    /// Same as [`Self::on_build_finished`] with an explicit clock for staleness.
    pub async fn on_build_finished_at(
        &self,
        notification: &BuildNotification,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        if !notification.status.is_finished() {
            return Ok(SyncOutcome::Skipped(SkipReason::NotFinished(
                notification.status,
            )));
        }
        if notification.build_type_id != self.gating_build_type_id {
            return Ok(SyncOutcome::Skipped(SkipReason::OtherBuildType(
                notification.build_type_id.clone(),
            )));
        }

        let build = self
            .teamcity
            .find_build(&notification.build_id)
            .await
            .map_err(|source| SyncError::BuildLookup {
                build_id: notification.build_id.clone(),
                source,
            })?
            .ok_or_else(|| SyncError::BuildNotFound(notification.build_id.clone()))?;

        if !TRACKED_BRANCHES.contains(&build.branch_name.as_str()) {
            return Ok(SyncOutcome::Skipped(SkipReason::UntrackedBranch(
                build.branch_name,
            )));
        }

        let target = status_mapper::target_state(&build)?;

        let pull_requests = self
            .github
            .list_open_pull_requests(&self.repo)
            .await
            .map_err(|source| SyncError::PullRequestListing {
                repo: self.repo.clone(),
                source,
            })?;

        let mut report = SyncReport::default();
        for pr in &pull_requests {
            report.examined += 1;
            match decide(&build, target, pr, now) {
                PrDecision::Stale => {
                    tracing::debug!(pr = %pr.url, "Skip stale PR");
                    report.stale += 1;
                }
                PrDecision::OtherBranch => report.other_branch += 1,
                PrDecision::UpToDate => report.up_to_date += 1,
                PrDecision::Update => {
                    if self.write_status(&build, target, pr).await {
                        report.updated += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            build_id = %build.id,
            branch = %build.branch_name,
            state = %target,
            examined = report.examined,
            stale = report.stale,
            up_to_date = report.up_to_date,
            other_branch = report.other_branch,
            updated = report.updated,
            failed = report.failed,
            "CI status synchronized"
        );
        Ok(SyncOutcome::Synchronized(report))
    }

    /// Write one status. Failures are logged and isolated to this PR.
    async fn write_status(&self, build: &Build, target: CommitStatusState, pr: &PullRequest) -> bool {
        let status = NewCommitStatus {
            commit_id: pr.head_commit_id.clone(),
            state: target,
            target_url: build.home_url.clone(),
            description: status_mapper::describe(&self.gating_build_label, build, target),
            context: CI_STATUS_CONTEXT.to_string(),
        };

        match self.github.create_commit_status(&self.repo, &status).await {
            Ok(()) => {
                tracing::info!(pr = %pr.url, commit = %pr.head_commit_id, state = %target, "Updated CI status");
                crate::metrics::status_updated(&target.to_string());
                true
            }
            Err(e) => {
                tracing::warn!(pr = %pr.url, commit = %pr.head_commit_id, "Failed to update CI status: {e}");
                crate::metrics::status_update_failed();
                false
            }
        }
    }
}

fn decide(build: &Build, target: CommitStatusState, pr: &PullRequest, now: DateTime<Utc>) -> PrDecision {
    if freshness::is_stale(pr, now) {
        PrDecision::Stale
    } else if status_mapper::needs_update(build, target, pr, CI_STATUS_CONTEXT) {
        PrDecision::Update
    } else if build.branch_name != pr.base_branch {
        PrDecision::OtherBranch
    } else {
        PrDecision::UpToDate
    }
}
