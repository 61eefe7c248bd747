//! Diagnostic probe handler.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::dto::DiagnosticResponse;
use crate::app_state::AppState;
use crate::service::run_diagnostics;

/// `GET /api/diagnostic`: Step-by-step health probe.
#[utoipa::path(
    get,
    path = "/api/diagnostic",
    tag = "Diagnostics",
    summary = "Run the diagnostic probe",
    description = "Checks configuration, store connectivity, upstream reachability, and a store write/read round trip. Stops at the first failing step and names it.",
    responses(
        (status = 200, description = "All steps passed", body = DiagnosticResponse),
        (status = 500, description = "A step failed", body = DiagnosticResponse),
    )
)]
pub async fn diagnostic(State(state): State<AppState>) -> impl IntoResponse {
    let report = run_diagnostics(state.sync_service().map(Arc::as_ref)).await;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if let Some((step, error)) = &report.failure {
        tracing::warn!(%step, %error, "diagnostic probe failed");
    }
    (status, Json(DiagnosticResponse::from(report)))
}
