//! HTTP endpoint handlers organized by trigger and resource.

pub mod diagnostic;
pub mod proxy;
pub mod snapshots;
pub mod system;
pub mod trigger;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Trigger, probe, and proxy routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cron/sync",
            get(trigger::scheduled_sync).post(trigger::scheduled_sync),
        )
        .route(
            "/sync",
            get(trigger::manual_sync).post(trigger::manual_sync),
        )
        .route("/diagnostic", get(diagnostic::diagnostic))
        .route("/proxy", get(proxy::proxy))
}
