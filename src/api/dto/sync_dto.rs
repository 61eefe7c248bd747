//! Sync trigger response bodies.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{LeagueReport, SyncReport};

/// Response body of a successful sync trigger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// Always `true`; failures use [`crate::error::ErrorResponse`].
    pub success: bool,
    /// Gameweek the snapshots were written under.
    pub gameweek: i32,
    /// `false` when the fallback gameweek was used.
    pub gameweek_detected: bool,
    /// Snapshot rows written.
    pub managers_processed: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// Per-league fetch outcome, primary league first.
    pub leagues: Vec<LeagueSummaryDto>,
}

/// Per-league fetch outcome.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSummaryDto {
    /// League label.
    pub label: String,
    /// Upstream league id.
    pub league_id: i64,
    /// Managers read.
    pub managers: usize,
    /// Pages fetched.
    pub pages: u32,
    /// `false` when pagination stopped early.
    pub complete: bool,
}

impl From<LeagueReport> for LeagueSummaryDto {
    fn from(report: LeagueReport) -> Self {
        Self {
            label: report.label,
            league_id: report.league_id,
            managers: report.managers,
            pages: report.pages,
            complete: report.complete,
        }
    }
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            gameweek: report.gameweek,
            gameweek_detected: report.gameweek_detected,
            managers_processed: report.managers_processed,
            duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            leagues: report.leagues.into_iter().map(Into::into).collect(),
        }
    }
}
