//! Shared in-memory collaborators for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::ClientError;
use crate::models::build::{Build, BuildStatus};
use crate::models::commit_status::NewCommitStatus;
use crate::models::pull_request::{PullRequest, StatusContext};
use crate::services::ci_status_sync::CiStatusSynchronizer;
use crate::services::github_service::SourceHost;
use crate::services::teamcity_service::BuildSystem;

pub const GATE: &str = "Gradle_Check_Ready_ForNightly";
pub const REPO: &str = "gradle/gradle";

/// In-memory GitHub that records writes back onto the PR snapshot.
#[derive(Default)]
pub struct FakeGitHub {
    pub pull_requests: Mutex<Vec<PullRequest>>,
    pub writes: Mutex<Vec<NewCommitStatus>>,
    pub failing_commits: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub list_fails: bool,
}

impl FakeGitHub {
    pub fn with(pull_requests: Vec<PullRequest>) -> Self {
        Self {
            pull_requests: Mutex::new(pull_requests),
            ..Default::default()
        }
    }

    pub fn writes(&self) -> Vec<NewCommitStatus> {
        self.writes.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceHost for FakeGitHub {
    async fn init(&self) -> Result<(), ClientError> {
        Ok(())
    }

    fn who_am_i(&self) -> Option<String> {
        Some("bot-gradle".to_string())
    }

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, ClientError> {
        assert_eq!(repo, REPO);
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails {
            return Err(ClientError::Status {
                service: "GitHub",
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(self.pull_requests.lock().unwrap().clone())
    }

    async fn create_commit_status(
        &self,
        _repo: &str,
        status: &NewCommitStatus,
    ) -> Result<(), ClientError> {
        if self.failing_commits.contains(&status.commit_id) {
            return Err(ClientError::Status {
                service: "GitHub",
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.writes.lock().unwrap().push(status.clone());
        let mut prs = self.pull_requests.lock().unwrap();
        for pr in prs.iter_mut().filter(|pr| pr.head_commit_id == status.commit_id) {
            pr.latest_commit_statuses.retain(|c| c.context != status.context);
            pr.latest_commit_statuses.push(StatusContext {
                context: status.context.clone(),
                state: status.state,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTeamCity {
    pub builds: HashMap<String, Build>,
    pub lookups: AtomicUsize,
    pub fails: bool,
}

impl FakeTeamCity {
    pub fn with(build: Build) -> Self {
        Self {
            builds: HashMap::from([(build.id.clone(), build)]),
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildSystem for FakeTeamCity {
    async fn find_build(&self, build_id: &str) -> Result<Option<Build>, ClientError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            return Err(ClientError::Status {
                service: "TeamCity",
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        Ok(self.builds.get(build_id).cloned())
    }
}

/// Build 123 with the given outcome and branch.
pub fn build(status: BuildStatus, branch: &str) -> Build {
    Build {
        id: "123".to_string(),
        status,
        branch_name: branch.to_string(),
        home_url: "https://builds.gradle.org/viewLog.html?buildId=123".to_string(),
    }
}

/// Open PR `number` targeting `base`, head commit `sha<number>`.
pub fn pr(number: u32, base: &str, committed_days_ago: i64, now: DateTime<Utc>) -> PullRequest {
    PullRequest {
        url: format!("https://github.com/gradle/gradle/pull/{number}"),
        base_branch: base.to_string(),
        head_commit_id: format!("sha{number}"),
        last_commit_at: Some(now - Duration::days(committed_days_ago)),
        latest_commit_statuses: vec![],
    }
}

/// Notification text as TeamCity posts it for build 123.
pub fn notification_text(status: &str, build_type: &str) -> String {
    format!(
        "{status} - *Ready for Nightly* <https://builds.gradle.org/viewLog.html?buildTypeId={build_type}&buildId=123|#42> (triggered by Gradle / Check / Ready for Merge)"
    )
}

pub fn synchronizer(github: &Arc<FakeGitHub>, teamcity: &Arc<FakeTeamCity>) -> CiStatusSynchronizer {
    CiStatusSynchronizer::new(github.clone(), teamcity.clone(), REPO, GATE)
}

/// Forwards every payload it receives on `channel` to a test receiver.
pub struct RecordingHandler {
    channel: String,
    seen: tokio::sync::mpsc::UnboundedSender<axum::body::Bytes>,
}

impl RecordingHandler {
    pub fn new(
        channel: &str,
    ) -> (
        Arc<Self>,
        tokio::sync::mpsc::UnboundedReceiver<axum::body::Bytes>,
    ) {
        let (seen, rx) = tokio::sync::mpsc::unbounded_channel();
        let handler = Self {
            channel: channel.to_string(),
            seen,
        };
        (Arc::new(handler), rx)
    }
}

#[async_trait]
impl crate::events::bus::EventHandler for RecordingHandler {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn handle(&self, payload: axum::body::Bytes) -> anyhow::Result<()> {
        self.seen.send(payload)?;
        Ok(())
    }
}
