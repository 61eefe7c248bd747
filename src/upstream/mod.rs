//! Upstream access: the HTTP client, wire models, league pagination and
//! gameweek detection.

pub mod client;
pub mod gameweek;
pub mod models;
pub mod paginator;

#[cfg(test)]
pub(crate) mod testutils;

pub use client::{FetchJson, UpstreamClient};
pub use gameweek::{GameweekResolution, current_gameweek, resolve_current_gameweek};
pub use paginator::{LeagueStandings, StopReason, fetch_all_pages};
