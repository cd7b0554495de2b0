//! `teamcity.build`: relays finished builds to pull request statuses.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;

use crate::events::bus::EventHandler;
use crate::models::notification::TeamCityPayload;
use crate::services::ci_status_sync::{CiStatusSynchronizer, SyncOutcome};
use crate::services::notification_parser;

pub const TEAMCITY_BUILD_CHANNEL: &str = "teamcity.build";

pub struct TeamCityBuildHandler {
    synchronizer: Arc<CiStatusSynchronizer>,
}

impl TeamCityBuildHandler {
    pub fn new(synchronizer: Arc<CiStatusSynchronizer>) -> Self {
        Self { synchronizer }
    }
}

#[async_trait]
impl EventHandler for TeamCityBuildHandler {
    fn channel(&self) -> &str {
        TEAMCITY_BUILD_CHANNEL
    }

    async fn handle(&self, payload: Bytes) -> anyhow::Result<()> {
        // Malformed notifications are dropped: redelivery would not fix them.
        let body: TeamCityPayload = match serde_json::from_slice(&payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    body = %String::from_utf8_lossy(&payload),
                    "Invalid TeamCity webhook payload: {e}"
                );
                crate::metrics::notification_dropped("invalid_json");
                return Ok(());
            }
        };

        let notification = match notification_parser::parse(&body.text) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::error!(body = %body.text, "Unparseable TeamCity notification: {e}");
                crate::metrics::notification_dropped("unrecognized_text");
                return Ok(());
            }
        };

        let outcome = self
            .synchronizer
            .on_build_finished(&notification)
            .await
            .with_context(|| {
                format!(
                    "build {} ({})",
                    notification.build_id, notification.build_type_id
                )
            })?;
        if let SyncOutcome::Skipped(reason) = outcome {
            tracing::debug!(text = %notification.text, "Skip TeamCity event: {reason}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::build::BuildStatus;
    use crate::test_utils::{build, notification_text, pr, synchronizer, FakeGitHub, FakeTeamCity, GATE};

    fn handler(github: &Arc<FakeGitHub>, teamcity: &Arc<FakeTeamCity>) -> TeamCityBuildHandler {
        TeamCityBuildHandler::new(Arc::new(synchronizer(github, teamcity)))
    }

    fn payload(text: &str) -> Bytes {
        Bytes::from(serde_json::to_vec(&serde_json::json!({ "text": text })).unwrap())
    }

    #[tokio::test]
    async fn relays_gating_build_to_open_prs() {
        let github = Arc::new(FakeGitHub::with(vec![pr(1, "master", 2, Utc::now())]));
        let teamcity = Arc::new(FakeTeamCity::with(build(BuildStatus::Success, "master")));

        handler(&github, &teamcity)
            .handle(payload(&notification_text("success", GATE)))
            .await
            .unwrap();

        assert_eq!(github.writes().len(), 1);
    }

    #[tokio::test]
    async fn malformed_payloads_are_dropped_quietly() {
        let github = Arc::new(FakeGitHub::default());
        let teamcity = Arc::new(FakeTeamCity::default());
        let handler = handler(&github, &teamcity);

        assert!(handler.handle(Bytes::from_static(b"not json")).await.is_ok());
        assert!(handler.handle(Bytes::from_static(br#"{"message": 1}"#)).await.is_ok());
        assert!(handler.handle(payload("Build queued")).await.is_ok());
        assert_eq!(teamcity.lookups(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_returned_to_the_bus() {
        let github = Arc::new(FakeGitHub::default());
        let teamcity = Arc::new(FakeTeamCity {
            fails: true,
            ..Default::default()
        });

        let err = handler(&github, &teamcity)
            .handle(payload(&notification_text("failure", GATE)))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("build 123"));
    }
}
