//! Sync pipeline: resolve gameweek → paginate leagues → reconcile → upsert.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;

use crate::config::{LeagueSet, SyncConfig};
use crate::domain::reconcile;
use crate::error::SyncError;
use crate::persistence::{Store, dedup_by_key};
use crate::upstream::{
    FetchJson, LeagueStandings, UpstreamClient, fetch_all_pages, resolve_current_gameweek,
};

/// Tunables of a sync run.
#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// Safety cap on pages per league.
    pub max_pages: u32,
    /// Gameweek used when detection fails.
    pub fallback_gameweek: i32,
    /// Deadline for the whole run.
    pub deadline: Duration,
}

impl SyncSettings {
    /// Extracts the sync tunables from configuration.
    #[must_use]
    pub const fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_pages: config.upstream_max_pages,
            fallback_gameweek: config.fallback_gameweek,
            deadline: config.sync_deadline(),
        }
    }
}

/// Per-league outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueReport {
    /// League label (`classic` for the primary league).
    pub label: String,
    /// Upstream league id.
    pub league_id: i64,
    /// Managers read from the league.
    pub managers: usize,
    /// Pages fetched.
    pub pages: u32,
    /// `false` when pagination stopped early and the list is partial.
    pub complete: bool,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Gameweek the snapshots were written under.
    pub gameweek: i32,
    /// `false` when the fallback gameweek was used.
    pub gameweek_detected: bool,
    /// Snapshot rows written.
    pub managers_processed: usize,
    /// Wall-clock time of the run.
    pub duration: Duration,
    /// Primary league first, then secondary leagues in configured order.
    pub leagues: Vec<LeagueReport>,
}

/// The one shared sync pipeline behind every trigger.
///
/// Holds the upstream source, the store, and the tracked leagues. There is
/// no state across runs; concurrent runs are not coordinated, and the last
/// write per `(manager, gameweek)` wins.
#[derive(Debug)]
pub struct SyncService<F = UpstreamClient> {
    fetcher: F,
    store: Store,
    leagues: LeagueSet,
    settings: SyncSettings,
}

impl SyncService<UpstreamClient> {
    /// Builds the production pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if store credentials or league ids
    /// are missing.
    pub fn from_config(config: &SyncConfig, upstream: UpstreamClient) -> Result<Self, SyncError> {
        let leagues = config.league_set()?;
        let store = Store::from_config(config)?;
        Ok(Self::new(
            upstream,
            store,
            leagues,
            SyncSettings::from_config(config),
        ))
    }
}

impl<F: FetchJson> SyncService<F> {
    /// Creates a pipeline over explicit parts.
    #[must_use]
    pub const fn new(fetcher: F, store: Store, leagues: LeagueSet, settings: SyncSettings) -> Self {
        Self {
            fetcher,
            store,
            leagues,
            settings,
        }
    }

    /// The upstream source.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The snapshot store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The tracked leagues.
    #[must_use]
    pub const fn leagues(&self) -> &LeagueSet {
        &self.leagues
    }

    /// Runs one sync under the configured deadline.
    ///
    /// Per-page upstream failures and gameweek detection failures do not
    /// fail the run; they show up as incomplete leagues and
    /// `gameweek_detected: false` in the report.
    ///
    /// # Errors
    ///
    /// - [`SyncError::DeadlineExceeded`] if the run takes too long.
    /// - [`SyncError::Storage`] if the upsert fails.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        tracing::info!(
            primary = self.leagues.primary.id,
            secondary = self.leagues.secondary.len(),
            "sync started"
        );

        let result = match tokio::time::timeout(self.settings.deadline, self.run_pipeline()).await
        {
            Ok(result) => result,
            Err(_) => Err(SyncError::DeadlineExceeded(self.settings.deadline)),
        };

        match result {
            Ok((gameweek, gameweek_detected, managers_processed, leagues)) => {
                let report = SyncReport {
                    gameweek,
                    gameweek_detected,
                    managers_processed,
                    duration: started.elapsed(),
                    leagues,
                };
                tracing::info!(
                    gameweek,
                    gameweek_detected,
                    managers_processed,
                    duration_ms = report.duration.as_millis(),
                    "sync finished"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!(error = %err, elapsed_ms = started.elapsed().as_millis(), "sync failed");
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<(i32, bool, usize, Vec<LeagueReport>), SyncError> {
        let max_pages = self.settings.max_pages;
        let secondary_fetches: Vec<_> = self
            .leagues
            .secondary
            .iter()
            .map(|league| fetch_all_pages(&self.fetcher, league.id, max_pages))
            .collect();

        let (resolution, primary, secondary) = tokio::join!(
            resolve_current_gameweek(&self.fetcher, self.settings.fallback_gameweek),
            fetch_all_pages(&self.fetcher, self.leagues.primary.id, max_pages),
            join_all(secondary_fetches),
        );

        let mut reports = Vec::with_capacity(secondary.len() + 1);
        reports.push(league_report(&self.leagues.primary.label, &primary));
        let mut secondary_lists = BTreeMap::new();
        for (league, fetched) in self.leagues.secondary.iter().zip(secondary) {
            reports.push(league_report(&league.label, &fetched));
            secondary_lists.insert(league.label.clone(), fetched.standings);
        }

        if primary.standings.is_empty() {
            tracing::warn!(
                league_id = primary.league_id,
                stop = ?primary.stop,
                "primary league returned no managers"
            );
        }

        let now = Utc::now();
        let snapshots = reconcile(resolution.gameweek, &primary.standings, &secondary_lists, now);
        // A manager moving between pages mid-walk can be listed twice.
        let managers_processed = dedup_by_key(&snapshots).len();
        if managers_processed < snapshots.len() {
            tracing::warn!(
                listed = snapshots.len(),
                unique = managers_processed,
                "primary league listed some managers twice"
            );
        }
        self.store
            .save_sync(resolution.gameweek, &snapshots, now)
            .await?;

        Ok((
            resolution.gameweek,
            resolution.detected,
            managers_processed,
            reports,
        ))
    }
}

fn league_report(label: &str, fetched: &LeagueStandings) -> LeagueReport {
    LeagueReport {
        label: label.to_string(),
        league_id: fetched.league_id,
        managers: fetched.standings.len(),
        pages: fetched.pages_fetched,
        complete: fetched.stop.is_complete(),
    }
}
