//! Optional in-process interval runner for deployments without an
//! external scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::SyncService;
use crate::upstream::FetchJson;

/// Spawns a task that runs `service` every `every`, starting immediately.
///
/// A run that overruns the period delays the next one instead of
/// stacking runs. Outcomes are logged; failures do not stop the loop.
pub fn spawn_scheduler<F>(service: Arc<SyncService<F>>, every: Duration) -> JoinHandle<()>
where
    F: FetchJson + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = every.as_secs(), "sync scheduler started");

        loop {
            ticker.tick().await;
            match service.run().await {
                Ok(report) => tracing::info!(
                    gameweek = report.gameweek,
                    managers_processed = report.managers_processed,
                    "scheduled sync succeeded"
                ),
                Err(err) => tracing::error!(error = %err, "scheduled sync failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{League, LeagueSet};
    use crate::persistence::{MemoryStore, Store};
    use crate::service::SyncSettings;
    use crate::upstream::testutils::ScriptedFetcher;

    #[tokio::test]
    async fn runs_sync_on_interval() {
        let store = MemoryStore::new();
        let fetcher = ScriptedFetcher::new()
            .with_current_gameweek(4)
            .with_league(1, &[&[(10, 1, 30)]])
            .with_league(2, &[&[(10, 1, 0)]]);
        let service = Arc::new(SyncService::new(
            fetcher,
            Store::Memory(store.clone()),
            LeagueSet {
                primary: League {
                    label: "classic".to_string(),
                    id: 1,
                },
                secondary: vec![League {
                    label: "h2h".to_string(),
                    id: 2,
                }],
            },
            SyncSettings {
                max_pages: 10,
                fallback_gameweek: 1,
                deadline: Duration::from_secs(5),
            },
        ));

        let handle = spawn_scheduler(Arc::clone(&service), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert_eq!(store.load_gameweek_marker().await.map(|m| m.gameweek), Some(4));
        assert_eq!(store.load_snapshots(4).await.len(), 1);
        let bootstrap_calls = service
            .fetcher()
            .requests()
            .iter()
            .filter(|p| p.starts_with("bootstrap-static"))
            .count();
        assert!(bootstrap_calls >= 2);
    }
}
