// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::point_service::PointLookupService;
use crate::application::range_service::RangeQueryService;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::infrastructure::config::{load_monitor_config, load_store_config};
use crate::infrastructure::postgrest_repository::PostgrestRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_chart, get_gauges, get_latest, get_loops, get_readings, health_check, post_refresh,
    put_mode, put_range, search, stream_loops,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let store_config = load_store_config().context("Failed to load config/store")?;
    let monitor_config = load_monitor_config().context("Failed to load config/monitor")?;
    let monitor = monitor_config.monitor;

    // Create repository (infrastructure layer)
    let repository = Arc::new(PostgrestRepository::new(
        store_config.store.url,
        store_config.store.api_key,
        store_config.store.table,
    ));

    // Create services (application layer)
    let range_service = RangeQueryService::new(repository.clone());
    let point_service = PointLookupService::new(repository.clone());
    let scheduler = RefreshScheduler::new(
        range_service,
        point_service.clone(),
        monitor.default_range(),
        monitor.refresh_interval(),
    );
    scheduler.activate();

    // Create application state
    let state = Arc::new(AppState {
        scheduler: scheduler.clone(),
        point_service,
    });

    // Build router (presentation layer)
    // Responses are compressed in the handlers, so no CompressionLayer here.
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/loops", get(get_loops))
        .route("/loops/latest", get(get_latest))
        .route("/loops/readings", get(get_readings))
        .route("/loops/gauges", get(get_gauges))
        .route("/loops/chart", get(get_chart))
        .route("/loops/mode", put(put_mode))
        .route("/loops/range", put(put_range))
        .route("/loops/refresh", post(post_refresh))
        .route("/loops/search", get(search))
        .route("/loops/stream", get(stream_loops))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = monitor
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", monitor.listen_addr))?;
    tracing::info!("Starting loop-fullness service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.deactivate();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
