//! Static handler registry, built once at startup.

use std::sync::Arc;

use crate::events::bus::{EventBus, EventHandler};
use crate::handlers::github::GitHubPingHandler;
use crate::handlers::teamcity::TeamCityBuildHandler;
use crate::services::ci_status_sync::CiStatusSynchronizer;

/// All handlers the relay runs. Adding a handler means adding it here.
pub fn handlers(synchronizer: Arc<CiStatusSynchronizer>) -> Vec<Arc<dyn EventHandler>> {
    vec![
        Arc::new(TeamCityBuildHandler::new(synchronizer)),
        Arc::new(GitHubPingHandler),
    ]
}

/// Subscribe every handler to its channel on `bus`.
pub fn register_handlers(bus: &mut EventBus, handlers: Vec<Arc<dyn EventHandler>>) {
    for handler in handlers {
        let channel = handler.channel().to_string();
        tracing::info!(channel = %channel, "Registered event handler");
        bus.subscribe(channel, handler);
    }
}
