//! In-process event bus and the static handler registry.
//!
//! Webhook routes publish raw payloads on `<source>.<event type>` channels;
//! handlers subscribe to exactly one channel each.

pub mod bus;
pub mod registry;

/// Channel name for an inbound event, e.g. `github.pull_request`.
pub fn channel_name(source: &str, event_type: &str) -> String {
    format!("{source}.{event_type}")
}
