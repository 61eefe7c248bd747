//! Read-only views of stored snapshots.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{GameweekResponse, SnapshotDto, SnapshotListResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, SyncError};

/// `GET /gameweek`: Gameweek marker written by the last successful sync.
///
/// # Errors
///
/// Returns [`SyncError::NotFound`] before the first sync, or a storage
/// or configuration error.
#[utoipa::path(
    get,
    path = "/api/v1/gameweek",
    tag = "Snapshots",
    summary = "Current gameweek marker",
    responses(
        (status = 200, description = "Marker found", body = GameweekResponse),
        (status = 404, description = "No sync has completed yet", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn get_gameweek(State(state): State<AppState>) -> Result<impl IntoResponse, SyncError> {
    let marker = state
        .sync_service()?
        .store()
        .load_gameweek_marker()
        .await?
        .ok_or_else(|| SyncError::NotFound("no gameweek recorded yet".to_string()))?;
    Ok(Json(GameweekResponse::from(marker)))
}

/// `GET /snapshots/{gameweek}`: All snapshots stored for a gameweek.
///
/// # Errors
///
/// Returns [`SyncError::InvalidRequest`] for a non-numeric or non-positive
/// gameweek, or a
/// storage or configuration error.
#[utoipa::path(
    get,
    path = "/api/v1/snapshots/{gameweek}",
    tag = "Snapshots",
    summary = "Snapshots for a gameweek",
    params(("gameweek" = i32, Path, description = "Gameweek number")),
    responses(
        (status = 200, description = "Rows ordered by classic rank", body = SnapshotListResponse),
        (status = 400, description = "Invalid gameweek", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn list_snapshots(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, SyncError> {
    let gameweek = parse_gameweek(&raw)?;
    let rows = state
        .sync_service()?
        .store()
        .load_snapshots(gameweek)
        .await?;
    let data: Vec<SnapshotDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(SnapshotListResponse {
        gameweek,
        count: data.len(),
        data,
    }))
}

/// Parses the `{gameweek}` segment. Done here rather than by `Path<i32>`
/// so a bad segment still gets the JSON error body.
fn parse_gameweek(raw: &str) -> Result<i32, SyncError> {
    match raw.trim().parse::<i32>() {
        Ok(gameweek) if gameweek >= 1 => Ok(gameweek),
        Ok(gameweek) => Err(SyncError::InvalidRequest(format!(
            "gameweek must be positive, got {gameweek}"
        ))),
        Err(_) => Err(SyncError::InvalidRequest(format!(
            "gameweek must be a number, got `{raw}`"
        ))),
    }
}

/// Snapshot routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gameweek", get(get_gameweek))
        .route("/snapshots/{gameweek}", get(list_snapshots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_gameweeks() {
        assert_eq!(parse_gameweek("11"), Ok(11));
        assert_eq!(parse_gameweek("1"), Ok(1));
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        assert!(matches!(parse_gameweek("abc"), Err(SyncError::InvalidRequest(_))));
        assert!(matches!(parse_gameweek("0"), Err(SyncError::InvalidRequest(_))));
        assert!(matches!(parse_gameweek("-3"), Err(SyncError::InvalidRequest(_))));
        assert!(matches!(parse_gameweek("99999999999"), Err(SyncError::InvalidRequest(_))));
    }
}
