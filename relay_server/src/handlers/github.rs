//! `github.*` handlers.

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Deserialize;

use crate::events::bus::EventHandler;

/// Delivery GitHub sends when a webhook is created or re-tested.
#[derive(Debug, Deserialize)]
struct PingEvent {
    #[serde(default)]
    zen: String,
    hook_id: Option<u64>,
}

pub struct GitHubPingHandler;

#[async_trait]
impl EventHandler for GitHubPingHandler {
    fn channel(&self) -> &str {
        "github.ping"
    }

    async fn handle(&self, payload: Bytes) -> anyhow::Result<()> {
        let ping: PingEvent = serde_json::from_slice(&payload)?;
        tracing::info!(hook_id = ?ping.hook_id, zen = %ping.zen, "Received GitHub ping webhook");
        Ok(())
    }
}
