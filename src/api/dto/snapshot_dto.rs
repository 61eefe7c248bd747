//! Stored snapshot and gameweek marker bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{GameweekMarker, ManagerSnapshot};

/// Response body of `GET /api/v1/gameweek`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameweekResponse {
    /// Current gameweek as of the last successful sync.
    pub gameweek: i32,
    /// Time of that sync.
    pub updated_at: DateTime<Utc>,
}

impl From<GameweekMarker> for GameweekResponse {
    fn from(marker: GameweekMarker) -> Self {
        Self {
            gameweek: marker.gameweek,
            updated_at: marker.updated_at,
        }
    }
}

/// One stored manager snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDto {
    /// Manager identifier.
    pub manager_id: i64,
    /// Team name.
    pub team_name: String,
    /// Manager display name.
    pub player_name: String,
    /// Classic league rank.
    pub rank: i32,
    /// Previous classic league rank.
    pub last_rank: Option<i32>,
    /// Gameweek points.
    pub event_points: i32,
    /// Cumulative points.
    pub total_points: i32,
    /// Secondary league ranks by label.
    pub league_ranks: BTreeMap<String, Option<i32>>,
    /// When the row was written.
    pub updated_at: DateTime<Utc>,
}

impl From<ManagerSnapshot> for SnapshotDto {
    fn from(s: ManagerSnapshot) -> Self {
        Self {
            manager_id: s.manager_id.get(),
            team_name: s.team_name,
            player_name: s.player_name,
            rank: s.rank,
            last_rank: s.last_rank,
            event_points: s.event_points,
            total_points: s.total_points,
            league_ranks: s.league_ranks,
            updated_at: s.updated_at,
        }
    }
}

/// Response body of `GET /api/v1/snapshots/{gameweek}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotListResponse {
    /// Requested gameweek.
    pub gameweek: i32,
    /// Number of rows.
    pub count: usize,
    /// Rows ordered by classic rank.
    pub data: Vec<SnapshotDto>,
}
