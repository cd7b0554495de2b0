//! Prometheus metrics for relay observability.

use metrics::counter;

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a webhook received from `source` (`github` or `teamcity`).
pub fn webhook_received(source: &'static str, event_type: &str) {
    counter!(
        "relay_webhooks_received_total",
        "source" => source,
        "event" => event_type.to_string()
    )
    .increment(1);
}

/// Record a GitHub webhook rejected for a bad or missing signature.
pub fn signature_rejected() {
    counter!("relay_signature_rejected_total").increment(1);
}

/// Record a TeamCity notification dropped before synchronization.
pub fn notification_dropped(reason: &'static str) {
    counter!("relay_notifications_dropped_total", "reason" => reason).increment(1);
}

/// Record a commit status written to GitHub.
pub fn status_updated(state: &str) {
    counter!("relay_status_updates_total", "state" => state.to_string()).increment(1);
}

/// Record a commit status write that GitHub rejected.
pub fn status_update_failed() {
    counter!("relay_status_update_failures_total").increment(1);
}

/// Record an event handler invocation that errored or panicked.
pub fn handler_failed(channel: &str) {
    counter!("relay_handler_failures_total", "channel" => channel.to_string()).increment(1);
}
