//! Persistence layer: per-gameweek manager snapshots and the current
//! gameweek marker.
//!
//! [`Store`] is the only writer of stored state. Every write is an upsert
//! keyed on `(manager_id, gameweek)` for snapshots and on the fixed id `1`
//! for the marker, so re-running a sync for the same gameweek overwrites
//! instead of duplicating. The PostgreSQL backend uses `sqlx::PgPool`; the
//! in-memory backend has the same semantics.

pub mod memory;
pub mod postgres;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::config::SyncConfig;
use crate::domain::{GameweekMarker, ManagerId, ManagerSnapshot};
use crate::error::SyncError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Manager id of the throwaway row written by round-trip probes.
pub(crate) const PROBE_MANAGER_ID: i64 = -1;

/// Snapshot store backend.
#[derive(Debug, Clone)]
pub enum Store {
    /// PostgreSQL via `sqlx`.
    Postgres(PostgresStore),
    /// In-process map.
    Memory(MemoryStore),
}

impl Store {
    /// Builds the PostgreSQL store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] when store credentials are missing or
    /// the URL is malformed.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let credentials = config.store_credentials()?;
        Ok(Self::Postgres(PostgresStore::connect_lazy(
            &credentials,
            config,
        )?))
    }

    /// Upserts snapshots. An empty slice is a no-op. Returns the number of
    /// rows written.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] on backend failure.
    pub async fn upsert_snapshots(&self, snapshots: &[ManagerSnapshot]) -> Result<u64, SyncError> {
        match self {
            Self::Postgres(store) => store.upsert_snapshots(snapshots).await,
            Self::Memory(store) => Ok(store.upsert_snapshots(snapshots).await),
        }
    }

    /// Upserts snapshots and overwrites the gameweek marker as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] on backend failure.
    pub async fn save_sync(
        &self,
        gameweek: i32,
        snapshots: &[ManagerSnapshot],
        updated_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        match self {
            Self::Postgres(store) => store.save_sync(gameweek, snapshots, updated_at).await,
            Self::Memory(store) => Ok(store.save_sync(gameweek, snapshots, updated_at).await),
        }
    }

    /// Stored snapshots of one gameweek, ordered by classic rank.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] on backend failure.
    pub async fn load_snapshots(&self, gameweek: i32) -> Result<Vec<ManagerSnapshot>, SyncError> {
        match self {
            Self::Postgres(store) => store.load_snapshots(gameweek).await,
            Self::Memory(store) => Ok(store.load_snapshots(gameweek).await),
        }
    }

    /// The current gameweek marker, if any sync has completed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] on backend failure.
    pub async fn load_gameweek_marker(&self) -> Result<Option<GameweekMarker>, SyncError> {
        match self {
            Self::Postgres(store) => store.load_gameweek_marker().await,
            Self::Memory(store) => Ok(store.load_gameweek_marker().await),
        }
    }

    /// Connectivity check.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), SyncError> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }

    /// Write-then-read probe that leaves no data behind.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] if the probe cannot be written or
    /// read back.
    pub async fn round_trip(&self) -> Result<(), SyncError> {
        match self {
            Self::Postgres(store) => store.round_trip().await,
            Self::Memory(store) => store.round_trip().await,
        }
    }
}

/// Throwaway snapshot used by round-trip probes.
pub(crate) fn probe_snapshot(now: DateTime<Utc>) -> ManagerSnapshot {
    ManagerSnapshot {
        manager_id: ManagerId::new(PROBE_MANAGER_ID),
        gameweek: 0,
        team_name: format!("probe-{}", now.timestamp_millis()),
        player_name: "diagnostic".to_string(),
        rank: 0,
        last_rank: None,
        event_points: 0,
        total_points: 0,
        league_ranks: BTreeMap::new(),
        updated_at: now,
    }
}

/// Collapses rows sharing a `(manager_id, gameweek)` key to the last one,
/// keeping the position of the first occurrence. A single Postgres
/// `INSERT ... ON CONFLICT` cannot touch the same row twice.
#[must_use]
pub fn dedup_by_key(snapshots: &[ManagerSnapshot]) -> Vec<&ManagerSnapshot> {
    let mut positions: HashMap<(ManagerId, i32), usize> = HashMap::with_capacity(snapshots.len());
    let mut rows: Vec<&ManagerSnapshot> = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        match positions.get(&snapshot.key()) {
            Some(&index) => {
                if let Some(slot) = rows.get_mut(index) {
                    *slot = snapshot;
                }
            }
            None => {
                positions.insert(snapshot.key(), rows.len());
                rows.push(snapshot);
            }
        }
    }
    rows
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn snapshot(id: i64, gameweek: i32, total: i32) -> ManagerSnapshot {
        ManagerSnapshot {
            total_points: total,
            manager_id: ManagerId::new(id),
            gameweek,
            ..probe_snapshot(Utc::now())
        }
    }

    #[test]
    fn dedup_keeps_last_values_at_first_position() {
        let rows = [snapshot(1, 3, 10), snapshot(2, 3, 20), snapshot(1, 3, 30)];

        let deduped = dedup_by_key(&rows);

        let summary: Vec<(i64, i32)> = deduped
            .iter()
            .map(|s| (s.manager_id.get(), s.total_points))
            .collect();
        assert_eq!(summary, vec![(1, 30), (2, 20)]);
    }

    #[test]
    fn dedup_distinguishes_gameweeks() {
        let rows = [snapshot(1, 3, 10), snapshot(1, 4, 20)];
        assert_eq!(dedup_by_key(&rows).len(), 2);
    }

    #[tokio::test]
    async fn upserting_same_key_twice_leaves_one_row() {
        let store = Store::Memory(MemoryStore::new());

        let Ok(_) = store.upsert_snapshots(&[snapshot(8, 12, 100)]).await else {
            panic!("first upsert failed");
        };
        let Ok(_) = store.upsert_snapshots(&[snapshot(8, 12, 140)]).await else {
            panic!("second upsert failed");
        };

        let Ok(rows) = store.load_snapshots(12).await else {
            panic!("load failed");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|s| s.total_points), Some(140));
    }

    #[tokio::test]
    async fn empty_upsert_is_noop() {
        let store = Store::Memory(MemoryStore::new());
        assert_eq!(store.upsert_snapshots(&[]).await, Ok(0));
    }

    #[test]
    fn missing_credentials_fail_construction() {
        let config = SyncConfig::unconfigured();
        assert!(matches!(
            Store::from_config(&config),
            Err(SyncError::Config(_))
        ));
    }
}
