//! Webhook intake: authenticates GitHub deliveries and publishes every
//! accepted payload on the event bus.
//!
//! Nothing here fails the HTTP exchange: the caller always answers 200 so
//! senders never start aggressive redelivery. Outcomes are only logged.

use axum::body::Bytes;
use axum::http::HeaderMap;

use crate::config::RelayConfig;
use crate::events::bus::EventBus;
use crate::events::channel_name;
use crate::handlers::teamcity::TEAMCITY_BUILD_CHANNEL;
use crate::services::signature::{
    verify_signature, SignatureAlgorithm, SIGNATURE_256_HEADER, SIGNATURE_HEADER,
};

const GITHUB_EVENT_HEADER: &str = "x-github-event";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Prefer the SHA-256 signature when GitHub sends one.
fn signature_valid(secret: &str, headers: &HeaderMap, body: &[u8]) -> bool {
    match header(headers, SIGNATURE_256_HEADER) {
        Some(sig) => verify_signature(SignatureAlgorithm::Sha256, secret, body, Some(sig)),
        None => verify_signature(
            SignatureAlgorithm::Sha1,
            secret,
            body,
            header(headers, SIGNATURE_HEADER),
        ),
    }
}

/// Handle an incoming GitHub webhook payload.
pub async fn handle_github_webhook(
    config: &RelayConfig,
    bus: &EventBus,
    headers: &HeaderMap,
    body: Bytes,
) {
    if !signature_valid(&config.github_webhook_secret, headers, &body) {
        tracing::warn!(
            signature = ?header(headers, SIGNATURE_HEADER),
            signature_256 = ?header(headers, SIGNATURE_256_HEADER),
            "Received GitHub webhook with bad signature, discard"
        );
        crate::metrics::signature_rejected();
        return;
    }

    let Some(event_type) = header(headers, GITHUB_EVENT_HEADER) else {
        tracing::info!("Received GitHub webhook without event type, discard");
        return;
    };

    let channel = channel_name("github", event_type);
    tracing::debug!(channel = %channel, "Publishing GitHub webhook");
    bus.publish(&channel, body).await;
}

/// Handle an incoming TeamCity notification. Parsing happens in the handler.
pub async fn handle_teamcity_webhook(bus: &EventBus, body: Bytes) {
    tracing::debug!(channel = TEAMCITY_BUILD_CHANNEL, "Publishing TeamCity webhook");
    bus.publish(TEAMCITY_BUILD_CHANNEL, body).await;
}
