mod auth;
mod background;
mod clock;
mod config;
mod db;
mod errors;
mod models;
mod notifications;
mod response;
mod routes;
mod state;
mod store;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::create_pool;
use crate::notifications::service::NotificationService;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;
use crate::tracking::service::TimeTrackingService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pivot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    // Services are constructed once and shared through AppState
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let time_tracking = Arc::new(TimeTrackingService::new(
        store.clone(),
        clock.clone(),
        config.completion_policy,
    ));
    let notifications = Arc::new(NotificationService::new(
        store,
        time_tracking.clone(),
        clock,
        config.deadline_dedup,
    ));
    info!(
        "Completion policy: {:?}, deadline dedup: {}",
        config.completion_policy, config.deadline_dedup
    );

    // Background deadline sweep
    let cancel = CancellationToken::new();
    let sweep = tokio::spawn(background::deadline_sweep::run(
        time_tracking.clone(),
        notifications.clone(),
        Duration::from_secs(config.sweep_interval_secs.max(1)),
        cancel.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        time_tracking,
        notifications,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front-end domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    sweep.await?;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels background jobs.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    cancel.cancel();
}
