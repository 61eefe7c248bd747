//! Persisted snapshot records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ManagerId;

/// Merged per-manager, per-gameweek row.
///
/// Unique per `(manager_id, gameweek)`: a later sync for the same
/// gameweek overwrites the row, it never adds a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    /// Manager identifier.
    pub manager_id: ManagerId,
    /// Gameweek the snapshot was taken in.
    pub gameweek: i32,
    /// Team name.
    pub team_name: String,
    /// Manager display name.
    pub player_name: String,
    /// Rank in the primary (classic) league.
    pub rank: i32,
    /// Previous rank in the primary league, if known.
    pub last_rank: Option<i32>,
    /// Gameweek points.
    pub event_points: i32,
    /// Cumulative points.
    pub total_points: i32,
    /// Rank per secondary league label; `None` when the manager is absent
    /// from that league.
    pub league_ranks: BTreeMap<String, Option<i32>>,
    /// When this row was produced.
    pub updated_at: DateTime<Utc>,
}

impl ManagerSnapshot {
    /// Storage conflict key.
    #[must_use]
    pub const fn key(&self) -> (ManagerId, i32) {
        (self.manager_id, self.gameweek)
    }
}

/// Singleton row tracking the active gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekMarker {
    /// Current gameweek as of the last successful sync.
    pub gameweek: i32,
    /// Time of that sync.
    pub updated_at: DateTime<Utc>,
}
