//! Relay HTTP routes: GitHub and TeamCity webhooks, health.

pub mod health;
pub mod webhook;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::events::bus::EventBus;

/// Shared state for relay route handlers.
#[derive(Clone)]
pub struct RelayRouterState {
    pub bus: Arc<EventBus>,
    pub config: RelayConfig,
}

/// Build the relay's Axum router.
pub fn relay_router(state: RelayRouterState) -> Router {
    Router::new()
        // Webhooks
        .route("/github", post(github_webhook_handler))
        .route("/teamcity", post(teamcity_webhook_handler))
        // Liveness
        .route("/health", get(health::health_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn empty_json() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

// ── Webhooks ──

async fn github_webhook_handler(
    State(state): State<RelayRouterState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<serde_json::Value> {
    crate::metrics::webhook_received(
        "github",
        headers
            .get("x-github-event")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown"),
    );

    webhook::handle_github_webhook(&state.config, &state.bus, &headers, body).await;
    empty_json()
}

async fn teamcity_webhook_handler(
    State(state): State<RelayRouterState>,
    body: Bytes,
) -> Json<serde_json::Value> {
    crate::metrics::webhook_received("teamcity", "build");

    webhook::handle_teamcity_webhook(&state.bus, body).await;
    empty_json()
}
