//! Sync trigger handlers: scheduled (secret-protected) and manual.
//!
//! Both triggers run the same pipeline and return the same body. They
//! differ only in the [`TriggerAuth`] policy checked before any upstream
//! call or store write happens.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;

use crate::api::dto::SyncResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, SyncError};

/// Header carrying the shared secret for the scheduled trigger.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Access policy of a trigger entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAuth {
    /// Caller must present the configured shared secret.
    SharedSecret,
    /// No caller check.
    Open,
}

/// Extracts the secret a caller presented, if any.
///
/// `x-cron-secret` wins over `Authorization: Bearer`.
fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(value.trim());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Checks `headers` against `policy`.
///
/// # Errors
///
/// Returns [`SyncError::Config`] if the policy needs a secret and none is
/// configured, and [`SyncError::Unauthorized`] if the presented one is
/// missing or wrong.
pub fn authorize(
    policy: TriggerAuth,
    headers: &HeaderMap,
    configured: Option<&str>,
) -> Result<(), SyncError> {
    if policy == TriggerAuth::Open {
        return Ok(());
    }
    let Some(expected) = configured.filter(|s| !s.is_empty()) else {
        return Err(SyncError::Config("CRON_SECRET is not set".to_string()));
    };
    match presented_secret(headers) {
        Some(presented) if presented == expected => Ok(()),
        Some(_) => Err(SyncError::Unauthorized("secret mismatch".to_string())),
        None => Err(SyncError::Unauthorized("missing secret".to_string())),
    }
}

async fn execute_sync(
    state: &AppState,
    policy: TriggerAuth,
    headers: &HeaderMap,
) -> Result<SyncResponse, SyncError> {
    authorize(policy, headers, state.config.cron_secret.as_deref()).inspect_err(|err| {
        tracing::warn!(error = %err, "sync trigger rejected");
    })?;
    let service = state.sync_service()?;
    let report = service.run().await?;
    Ok(report.into())
}

/// `GET|POST /api/cron/sync`: Scheduled sync trigger.
///
/// # Errors
///
/// Returns [`SyncError`] when the secret is wrong, configuration is
/// missing, or the run fails.
#[utoipa::path(
    method(get, post),
    path = "/api/cron/sync",
    tag = "Sync",
    summary = "Scheduled sync",
    description = "Runs a full standings sync. Requires the shared secret in `x-cron-secret` or as an `Authorization: Bearer` token.",
    responses(
        (status = 200, description = "Sync completed", body = SyncResponse),
        (status = 401, description = "Missing or wrong secret", body = ErrorResponse),
        (status = 500, description = "Configuration, upstream, or storage failure", body = ErrorResponse),
    )
)]
pub async fn scheduled_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, SyncError> {
    let response = execute_sync(&state, TriggerAuth::SharedSecret, &headers).await?;
    Ok(Json(response))
}

/// `GET|POST /api/sync`: Manual sync trigger.
///
/// # Errors
///
/// Returns [`SyncError`] when configuration is missing or the run fails.
#[utoipa::path(
    method(get, post),
    path = "/api/sync",
    tag = "Sync",
    summary = "Manual sync",
    description = "Runs a full standings sync on demand without a secret check.",
    responses(
        (status = 200, description = "Sync completed", body = SyncResponse),
        (status = 500, description = "Configuration, upstream, or storage failure", body = ErrorResponse),
    )
)]
pub async fn manual_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, SyncError> {
    let response = execute_sync(&state, TriggerAuth::Open, &headers).await?;
    Ok(Json(response))
}
