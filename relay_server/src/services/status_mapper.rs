//! Mapping between TeamCity build outcomes and GitHub commit statuses.

use thiserror::Error;

use crate::models::build::{Build, BuildStatus};
use crate::models::commit_status::CommitStatusState;
use crate::models::pull_request::PullRequest;

/// GitHub rejects status descriptions longer than this.
const MAX_DESCRIPTION_CHARS: usize = 140;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("build status {0} has no commit status equivalent")]
pub struct UnmappedBuildStatus(pub BuildStatus);

/// Commit status a build outcome should be reflected as.
pub fn target_state(build: &Build) -> Result<CommitStatusState, UnmappedBuildStatus> {
    match build.status {
        BuildStatus::Success => Ok(CommitStatusState::Success),
        BuildStatus::Failure => Ok(CommitStatusState::Failure),
        BuildStatus::Error => Ok(CommitStatusState::Error),
        BuildStatus::Unknown => Err(UnmappedBuildStatus(build.status)),
    }
}

/// State currently recorded for `context` on the PR's latest commit.
pub fn current_state(pr: &PullRequest, context: &str) -> Option<CommitStatusState> {
    pr.latest_commit_statuses
        .iter()
        .find(|status| status.context == context)
        .map(|status| status.state)
}

/// Whether `pr` needs a status write to reflect `build`.
pub fn needs_update(build: &Build, target: CommitStatusState, pr: &PullRequest, context: &str) -> bool {
    current_state(pr, context) != Some(target) && build.branch_name == pr.base_branch
}

/// Human-readable status description, linking to the build.
///
/// `label` names the gating build, e.g. `Ready for Nightly`.
pub fn describe(label: &str, build: &Build, target: CommitStatusState) -> String {
    let verb = match target {
        CommitStatusState::Success => "passed",
        CommitStatusState::Failure => "failed",
        CommitStatusState::Error => "errored",
        CommitStatusState::Pending | CommitStatusState::Expected => "is pending",
    };
    let description = format!(
        "{} {} on {}: {}",
        label, verb, build.branch_name, build.home_url
    );
    truncate_chars(&description, MAX_DESCRIPTION_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pull_request::StatusContext;

    fn build(status: BuildStatus, branch: &str) -> Build {
        Build {
            id: "42".to_string(),
            status,
            branch_name: branch.to_string(),
            home_url: "https://builds.gradle.org/viewLog.html?buildId=42".to_string(),
        }
    }

    fn pr(base: &str, statuses: Vec<(&str, CommitStatusState)>) -> PullRequest {
        PullRequest {
            url: "https://github.com/gradle/gradle/pull/1".to_string(),
            base_branch: base.to_string(),
            head_commit_id: "abc123".to_string(),
            last_commit_at: None,
            latest_commit_statuses: statuses
                .into_iter()
                .map(|(context, state)| StatusContext {
                    context: context.to_string(),
                    state,
                })
                .collect(),
        }
    }

    #[test]
    fn maps_build_status() {
        assert_eq!(
            target_state(&build(BuildStatus::Success, "master")),
            Ok(CommitStatusState::Success)
        );
        assert_eq!(
            target_state(&build(BuildStatus::Failure, "master")),
            Ok(CommitStatusState::Failure)
        );
        assert_eq!(
            target_state(&build(BuildStatus::Error, "master")),
            Ok(CommitStatusState::Error)
        );
        assert_eq!(
            target_state(&build(BuildStatus::Unknown, "master")),
            Err(UnmappedBuildStatus(BuildStatus::Unknown))
        );
    }

    #[test]
    fn current_state_reads_only_owned_context() {
        let pr = pr(
            "master",
            vec![
                ("continuous-integration/other", CommitStatusState::Failure),
                ("CI Status", CommitStatusState::Success),
            ],
        );
        assert_eq!(current_state(&pr, "CI Status"), Some(CommitStatusState::Success));
        assert_eq!(current_state(&pr, "missing"), None);
    }

    #[test]
    fn update_needed_when_state_differs_on_same_branch() {
        let build = build(BuildStatus::Success, "master");
        let fresh = pr("master", vec![]);
        assert!(needs_update(&build, CommitStatusState::Success, &fresh, "CI Status"));

        let failing = pr("master", vec![("CI Status", CommitStatusState::Failure)]);
        assert!(needs_update(&build, CommitStatusState::Success, &failing, "CI Status"));
    }

    #[test]
    fn no_update_when_state_already_reflected() {
        let build = build(BuildStatus::Success, "master");
        let done = pr("master", vec![("CI Status", CommitStatusState::Success)]);
        assert!(!needs_update(&build, CommitStatusState::Success, &done, "CI Status"));
    }

    #[test]
    fn no_update_when_pr_targets_other_branch() {
        let build = build(BuildStatus::Success, "master");
        let release_pr = pr("release", vec![]);
        assert!(!needs_update(&build, CommitStatusState::Success, &release_pr, "CI Status"));
    }

    #[test]
    fn description_embeds_home_url() {
        let build = build(BuildStatus::Failure, "release");
        assert_eq!(
            describe("Ready for Nightly", &build, CommitStatusState::Failure),
            "Ready for Nightly failed on release: https://builds.gradle.org/viewLog.html?buildId=42"
        );
    }

    #[test]
    fn description_uses_gating_label() {
        let build = build(BuildStatus::Success, "master");
        assert_eq!(
            describe("Ready for Release", &build, CommitStatusState::Success),
            "Ready for Release passed on master: https://builds.gradle.org/viewLog.html?buildId=42"
        );
    }

    #[test]
    fn description_is_capped() {
        let mut build = build(BuildStatus::Success, "master");
        build.home_url = format!("https://example.org/{}", "é".repeat(300));
        let description = describe("Ready for Nightly", &build, CommitStatusState::Success);
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
    }
}
