//! fpl-league-sync server entry point.
//!
//! Starts the Axum HTTP server with trigger, probe, proxy, and snapshot
//! endpoints, plus the optional in-process sync interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fpl_league_sync::api;
use fpl_league_sync::app_state::AppState;
use fpl_league_sync::config::SyncConfig;
use fpl_league_sync::service::spawn_scheduler;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration
    let config = SyncConfig::from_env().context("loading configuration")?;
    tracing::info!(addr = %config.listen_addr, ?config, "starting fpl-league-sync");
    let listen_addr = config.listen_addr;
    let interval_secs = config.sync_interval_secs;

    // Build application state
    let app_state = AppState::from_config(config).context("building upstream client")?;

    // Optional in-process schedule
    if interval_secs > 0 {
        match app_state.sync_service() {
            Ok(service) => {
                let _task = spawn_scheduler(Arc::clone(service), Duration::from_secs(interval_secs));
                tracing::info!(every_secs = interval_secs, "sync interval enabled");
            }
            Err(err) => tracing::warn!(error = %err, "sync interval requested but pipeline unavailable"),
        }
    }

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
