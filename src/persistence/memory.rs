//! In-process snapshot store.
//!
//! Same upsert semantics as the PostgreSQL store, held in a map behind a
//! [`tokio::sync::RwLock`]. Used by tests and for running the service
//! without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{GameweekMarker, ManagerId, ManagerSnapshot};
use crate::error::SyncError;

#[derive(Debug, Default)]
struct MemoryTables {
    snapshots: BTreeMap<(ManagerId, i32), ManagerSnapshot>,
    marker: Option<GameweekMarker>,
}

/// Map-backed store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<MemoryTables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites each snapshot by `(manager_id, gameweek)`.
    pub async fn upsert_snapshots(&self, snapshots: &[ManagerSnapshot]) -> u64 {
        let mut tables = self.tables.write().await;
        write_rows(&mut tables, snapshots)
    }

    /// Upserts the snapshots and the gameweek marker under one lock.
    pub async fn save_sync(
        &self,
        gameweek: i32,
        snapshots: &[ManagerSnapshot],
        updated_at: DateTime<Utc>,
    ) -> u64 {
        let mut tables = self.tables.write().await;
        let written = write_rows(&mut tables, snapshots);
        tables.marker = Some(GameweekMarker {
            gameweek,
            updated_at,
        });
        written
    }

    /// Snapshots of one gameweek ordered by classic rank, then manager id.
    pub async fn load_snapshots(&self, gameweek: i32) -> Vec<ManagerSnapshot> {
        let tables = self.tables.read().await;
        let mut rows: Vec<ManagerSnapshot> = tables
            .snapshots
            .values()
            .filter(|s| s.gameweek == gameweek)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.rank, s.manager_id));
        rows
    }

    /// The gameweek marker, if a sync has completed.
    pub async fn load_gameweek_marker(&self) -> Option<GameweekMarker> {
        self.tables.read().await.marker
    }

    /// Total number of stored snapshot rows across all gameweeks.
    pub async fn snapshot_count(&self) -> usize {
        self.tables.read().await.snapshots.len()
    }

    /// Writes a probe row, reads it back, and removes it again.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] if the probe cannot be read back.
    pub async fn round_trip(&self) -> Result<(), SyncError> {
        let probe = super::probe_snapshot(Utc::now());
        let mut tables = self.tables.write().await;
        let previous = tables.snapshots.insert(probe.key(), probe.clone());
        let read_back = tables.snapshots.get(&probe.key()).cloned();
        match previous {
            Some(row) => tables.snapshots.insert(probe.key(), row),
            None => tables.snapshots.remove(&probe.key()),
        };
        if read_back.as_ref() == Some(&probe) {
            Ok(())
        } else {
            Err(SyncError::Storage("probe row not readable after write".to_string()))
        }
    }
}

fn write_rows(tables: &mut MemoryTables, snapshots: &[ManagerSnapshot]) -> u64 {
    let mut written = 0;
    for snapshot in super::dedup_by_key(snapshots) {
        tables.snapshots.insert(snapshot.key(), snapshot.clone());
        written += 1;
    }
    written
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn snapshot(id: i64, gameweek: i32, total: i32) -> ManagerSnapshot {
        ManagerSnapshot {
            manager_id: ManagerId::new(id),
            gameweek,
            team_name: format!("Team {id}"),
            player_name: format!("Player {id}"),
            rank: 1,
            last_rank: None,
            event_points: 0,
            total_points: total,
            league_ranks: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn second_upsert_overwrites_first() {
        let store = MemoryStore::new();
        store.upsert_snapshots(&[snapshot(1, 5, 40)]).await;
        store.upsert_snapshots(&[snapshot(1, 5, 55)]).await;

        let rows = store.load_snapshots(5).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|s| s.total_points), Some(55));
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_keys_in_one_batch_count_once() {
        let store = MemoryStore::new();
        let written = store
            .upsert_snapshots(&[snapshot(1, 5, 40), snapshot(2, 5, 30), snapshot(1, 5, 45)])
            .await;

        assert_eq!(written, 2);
        assert_eq!(store.snapshot_count().await, 2);
        let totals: Vec<i32> = store
            .load_snapshots(5)
            .await
            .iter()
            .filter(|s| s.manager_id.get() == 1)
            .map(|s| s.total_points)
            .collect();
        assert_eq!(totals, vec![45]);
    }

    #[tokio::test]
    async fn different_gameweeks_are_distinct_rows() {
        let store = MemoryStore::new();
        store
            .upsert_snapshots(&[snapshot(1, 5, 40), snapshot(1, 6, 60)])
            .await;

        assert_eq!(store.snapshot_count().await, 2);
        assert_eq!(store.load_snapshots(6).await.len(), 1);
    }

    #[tokio::test]
    async fn save_sync_overwrites_marker() {
        let store = MemoryStore::new();
        assert!(store.load_gameweek_marker().await.is_none());

        store.save_sync(3, &[], Utc::now()).await;
        store.save_sync(4, &[], Utc::now()).await;

        assert_eq!(store.load_gameweek_marker().await.map(|m| m.gameweek), Some(4));
    }

    #[tokio::test]
    async fn round_trip_leaves_no_rows() {
        let store = MemoryStore::new();
        assert!(store.round_trip().await.is_ok());
        assert_eq!(store.snapshot_count().await, 0);
    }
}
