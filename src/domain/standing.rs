//! Per-league standing rows as produced by the paginator.

use serde::{Deserialize, Serialize};

use super::ManagerId;

/// One manager's row in one league for one fetch.
///
/// Field names follow the upstream `standings.results[]` objects so a
/// page can be deserialized directly. Never persisted on its own; the
/// reconciler folds it into a [`super::ManagerSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStanding {
    /// Manager identifier (`entry`).
    #[serde(rename = "entry")]
    pub manager_id: ManagerId,
    /// Manager display name.
    pub player_name: String,
    /// Team name (`entry_name`).
    #[serde(rename = "entry_name")]
    pub team_name: String,
    /// Points scored in the current gameweek (`event_total`).
    #[serde(rename = "event_total", default)]
    pub event_points: i32,
    /// Cumulative season points (`total`).
    #[serde(rename = "total", default)]
    pub total_points: i32,
    /// Rank within the league.
    pub rank: i32,
    /// Rank before the current gameweek, when the upstream reports one.
    #[serde(default)]
    pub last_rank: Option<i32>,
}
