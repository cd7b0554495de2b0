//! CI Status Relay: keeps GitHub pull request statuses in line with TeamCity.
//!
//! TeamCity posts build notifications to `/teamcity`; GitHub posts signed
//! webhooks to `/github`. Both are published on an in-process event bus.
//! When a Ready for Nightly build on `master` or `release` finishes, every
//! fresh open pull request targeting that branch gets its `CI Status`
//! commit status set to the build outcome.

mod config;
mod error;
mod events;
mod handlers;
mod metrics;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use crate::events::bus::EventBus;
use crate::events::registry;
use crate::services::ci_status_sync::CiStatusSynchronizer;
use crate::services::github_service::{GitHubClient, SourceHost};
use crate::services::teamcity_service::{BuildSystem, TeamCityClient};

#[derive(Parser)]
#[command(name = "ci-status-relay", about = "TeamCity to GitHub CI status relay")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "HTTP_PORT", default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting CI Status Relay...");

    let config = config::RelayConfig::from_env();

    // Clients
    let github = Arc::new(GitHubClient::new(
        &config.github_api_url,
        &config.github_access_token,
    ));
    let teamcity: Arc<dyn BuildSystem> = Arc::new(TeamCityClient::new(
        &config.teamcity_url,
        &config.teamcity_access_token,
    ));

    match github.init().await {
        Ok(()) => tracing::info!(
            "GitHub client initialized, I am {}",
            github.who_am_i().unwrap_or_default()
        ),
        Err(e) => tracing::error!("GitHub client initialization failed: {e}"),
    }

    // Handlers
    let synchronizer = Arc::new(CiStatusSynchronizer::new(
        github,
        teamcity,
        config.github_repo.clone(),
        config.gating_build_type_id.clone(),
    )
    .with_gating_label(config.gating_build_label.clone()));
    let mut bus = EventBus::new();
    registry::register_handlers(&mut bus, registry::handlers(synchronizer));

    let state = routes::RelayRouterState {
        bus: Arc::new(bus),
        config,
    };
    let app = routes::relay_router(state);

    // Initialize metrics
    metrics::init_metrics();

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("CI Status Relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
