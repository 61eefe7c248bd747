//! Wire shapes of the upstream documents the sync reads.

use serde::Deserialize;

use crate::domain::ManagerStanding;

/// Path of the bootstrap metadata document.
pub const BOOTSTRAP_PATH: &str = "bootstrap-static/";

/// Path of one standings page of a classic league. Pages are 1-indexed.
#[must_use]
pub fn standings_path(league_id: i64, page: u32) -> String {
    format!("leagues-classic/{league_id}/standings/?page_standings={page}")
}

/// Envelope of `leagues-classic/{id}/standings/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsResponse {
    /// The paginated standings block.
    pub standings: StandingsPage,
}

/// One page of league standings.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsPage {
    /// Whether another page follows this one.
    #[serde(default)]
    pub has_next: bool,
    /// Page number echoed by the upstream.
    #[serde(default)]
    pub page: Option<u32>,
    /// Rows on this page, in rank order.
    pub results: Vec<ManagerStanding>,
}

/// The subset of `bootstrap-static/` the sync needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapResponse {
    /// Gameweek descriptors for the season.
    #[serde(default)]
    pub events: Vec<EventDescriptor>,
}

/// One gameweek descriptor.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EventDescriptor {
    /// Gameweek number.
    pub id: i32,
    /// Set on exactly one gameweek while the season is running.
    #[serde(default)]
    pub is_current: bool,
}
