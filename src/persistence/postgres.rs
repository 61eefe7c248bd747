//! PostgreSQL implementation of the snapshot store.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{PROBE_MANAGER_ID, probe_snapshot};
use crate::config::{StoreCredentials, SyncConfig};
use crate::domain::{GameweekMarker, ManagerId, ManagerSnapshot};
use crate::error::SyncError;

/// Rows per `INSERT` statement. Ten binds per row keeps each statement
/// well under the 65 535 bind-parameter limit.
const UPSERT_CHUNK_ROWS: usize = 1000;

const UPSERT_SNAPSHOTS_PREFIX: &str = "INSERT INTO manager_snapshots \
     (manager_id, gw, team_name, player_name, classic_rank, last_rank, \
      event_points, total_points, league_ranks, updated_at) ";

const UPSERT_SNAPSHOTS_CONFLICT: &str = " ON CONFLICT (manager_id, gw) DO UPDATE SET \
     team_name = EXCLUDED.team_name, \
     player_name = EXCLUDED.player_name, \
     classic_rank = EXCLUDED.classic_rank, \
     last_rank = EXCLUDED.last_rank, \
     event_points = EXCLUDED.event_points, \
     total_points = EXCLUDED.total_points, \
     league_ranks = EXCLUDED.league_ranks, \
     updated_at = EXCLUDED.updated_at";

type SnapshotTuple = (
    i64,
    i32,
    String,
    String,
    i32,
    Option<i32>,
    i32,
    i32,
    serde_json::Value,
    DateTime<Utc>,
);

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily-connecting pool from the store credentials. No
    /// connection is attempted until the first query, so an unreachable
    /// database surfaces as a [`SyncError::Storage`] on use, not at startup.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the URL cannot be parsed.
    pub fn connect_lazy(
        credentials: &StoreCredentials,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        let options = PgConnectOptions::from_str(&credentials.url)
            .map_err(|e| SyncError::Config(format!("invalid DATABASE_URL: {e}")))?
            .password(&credentials.key);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_lazy_with(options);

        Ok(Self::new(pool))
    }

    /// Bulk upsert keyed on `(manager_id, gw)` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] on database failure; nothing is
    /// committed in that case.
    pub async fn upsert_snapshots(&self, snapshots: &[ManagerSnapshot]) -> Result<u64, SyncError> {
        if snapshots.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let written = upsert_in(&mut tx, snapshots).await?;
        tx.commit().await?;
        Ok(written)
    }

    /// Upserts the snapshots and the gameweek marker in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] on database failure; nothing is
    /// committed in that case.
    pub async fn save_sync(
        &self,
        gameweek: i32,
        snapshots: &[ManagerSnapshot],
        updated_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        let mut tx = self.pool.begin().await?;
        let written = upsert_in(&mut tx, snapshots).await?;

        sqlx::query(
            "INSERT INTO current_gameweek (id, gw, updated_at) VALUES (1, $1, $2) \
             ON CONFLICT (id) DO UPDATE SET gw = EXCLUDED.gw, updated_at = EXCLUDED.updated_at",
        )
        .bind(gameweek)
        .bind(updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(written)
    }

    /// Loads all snapshots of a gameweek ordered by classic rank.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] on database failure or an
    /// undecodable `league_ranks` column.
    pub async fn load_snapshots(&self, gameweek: i32) -> Result<Vec<ManagerSnapshot>, SyncError> {
        let rows = sqlx::query_as::<_, SnapshotTuple>(
            "SELECT manager_id, gw, team_name, player_name, classic_rank, last_rank, \
                    event_points, total_points, league_ranks, updated_at \
             FROM manager_snapshots WHERE gw = $1 ORDER BY classic_rank, manager_id",
        )
        .bind(gameweek)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(snapshot_from_row).collect()
    }

    /// Loads the gameweek marker, if a sync has ever completed.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] on database failure.
    pub async fn load_gameweek_marker(&self) -> Result<Option<GameweekMarker>, SyncError> {
        let row = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            "SELECT gw, updated_at FROM current_gameweek WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(gameweek, updated_at)| GameweekMarker {
            gameweek,
            updated_at,
        }))
    }

    /// Checks connectivity with `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] if the database cannot be reached.
    pub async fn ping(&self) -> Result<(), SyncError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Writes a probe snapshot, reads it back, and rolls the transaction
    /// back so nothing persists.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError::Storage`] if any step fails or the read does
    /// not return what was written.
    pub async fn round_trip(&self) -> Result<(), SyncError> {
        let probe = probe_snapshot(Utc::now());
        let mut tx = self.pool.begin().await?;
        upsert_in(&mut tx, std::slice::from_ref(&probe)).await?;

        let team_name = sqlx::query_scalar::<_, String>(
            "SELECT team_name FROM manager_snapshots WHERE manager_id = $1 AND gw = $2",
        )
        .bind(PROBE_MANAGER_ID)
        .bind(probe.gameweek)
        .fetch_optional(&mut *tx)
        .await?;

        tx.rollback().await?;

        match team_name {
            Some(name) if name == probe.team_name => Ok(()),
            Some(other) => Err(SyncError::Storage(format!(
                "probe read back `{other}`, expected `{}`",
                probe.team_name
            ))),
            None => Err(SyncError::Storage("probe row not readable after write".to_string())),
        }
    }
}

async fn upsert_in(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    snapshots: &[ManagerSnapshot],
) -> Result<u64, SyncError> {
    let rows = super::dedup_by_key(snapshots);
    let mut written = 0;

    for chunk in rows.chunks(UPSERT_CHUNK_ROWS) {
        let ranks = chunk
            .iter()
            .map(|snapshot| encode_league_ranks(snapshot))
            .collect::<Result<Vec<_>, _>>()?;
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(UPSERT_SNAPSHOTS_PREFIX);
        builder.push_values(chunk.iter().zip(ranks), |mut row, (snapshot, ranks)| {
            row.push_bind(snapshot.manager_id.get())
                .push_bind(snapshot.gameweek)
                .push_bind(snapshot.team_name.clone())
                .push_bind(snapshot.player_name.clone())
                .push_bind(snapshot.rank)
                .push_bind(snapshot.last_rank)
                .push_bind(snapshot.event_points)
                .push_bind(snapshot.total_points)
                .push_bind(ranks)
                .push_bind(snapshot.updated_at);
        });
        builder.push(UPSERT_SNAPSHOTS_CONFLICT);

        let result = builder.build().execute(&mut **tx).await?;
        written += result.rows_affected();
    }

    Ok(written)
}

/// JSONB value of the secondary rank map.
fn encode_league_ranks(snapshot: &ManagerSnapshot) -> Result<serde_json::Value, SyncError> {
    serde_json::to_value(&snapshot.league_ranks).map_err(|e| {
        SyncError::Storage(format!(
            "league_ranks of manager {}: {e}",
            snapshot.manager_id
        ))
    })
}

fn snapshot_from_row(row: SnapshotTuple) -> Result<ManagerSnapshot, SyncError> {
    let (
        manager_id,
        gameweek,
        team_name,
        player_name,
        rank,
        last_rank,
        event_points,
        total_points,
        league_ranks,
        updated_at,
    ) = row;

    let league_ranks = serde_json::from_value(league_ranks).map_err(|e| {
        SyncError::Storage(format!("league_ranks of manager {manager_id}: {e}"))
    })?;

    Ok(ManagerSnapshot {
        manager_id: ManagerId::new(manager_id),
        gameweek,
        team_name,
        player_name,
        rank,
        last_rank,
        event_points,
        total_points,
        league_ranks,
        updated_at,
    })
}
