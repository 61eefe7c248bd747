//! Iterative accumulation of every standings page of one league.
//!
//! Pages are requested one after another because each request depends on
//! the previous page's `has_next` flag. Any failure ends the walk early
//! and keeps what was accumulated so far; callers get partial results,
//! never an error.

use crate::domain::ManagerStanding;

use super::FetchJson;
use super::models::{StandingsResponse, standings_path};

/// Why pagination of a league ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page reported `has_next: false`.
    Exhausted,
    /// A page carried an empty result list.
    EmptyPage,
    /// A page body did not have the expected shape.
    Malformed(String),
    /// The upstream call for a page failed.
    UpstreamFailure(String),
    /// The page safety cap was reached while more pages were announced.
    PageLimit,
}

impl StopReason {
    /// `true` when the league was read to its natural end.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted | Self::EmptyPage)
    }
}

/// Accumulated standings of one league.
#[derive(Debug, Clone)]
pub struct LeagueStandings {
    /// League that was paginated.
    pub league_id: i64,
    /// Rows in upstream page order.
    pub standings: Vec<ManagerStanding>,
    /// Pages that were fetched and decoded.
    pub pages_fetched: u32,
    /// Why the walk ended.
    pub stop: StopReason,
}

/// Fetches pages `1..` of `league_id` until the upstream runs out of
/// pages, a page comes back empty, or something fails.
///
/// At most `max_pages` pages are requested (minimum one).
pub async fn fetch_all_pages<F: FetchJson>(
    fetcher: &F,
    league_id: i64,
    max_pages: u32,
) -> LeagueStandings {
    let max_pages = max_pages.max(1);
    let mut standings = Vec::new();
    let mut pages_fetched: u32 = 0;
    let mut page: u32 = 1;

    let stop = loop {
        if page > max_pages {
            tracing::warn!(league_id, max_pages, "page limit reached, standings truncated");
            break StopReason::PageLimit;
        }

        let path = standings_path(league_id, page);
        let body = match fetcher.fetch_json(&path).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(
                    league_id,
                    page,
                    kept = standings.len(),
                    error = %err,
                    "standings page failed, keeping partial results"
                );
                break StopReason::UpstreamFailure(err.to_string());
            }
        };

        let parsed = match serde_json::from_value::<StandingsResponse>(body) {
            Ok(parsed) => parsed.standings,
            Err(err) => {
                tracing::warn!(
                    league_id,
                    page,
                    kept = standings.len(),
                    error = %err,
                    "malformed standings page, keeping partial results"
                );
                break StopReason::Malformed(err.to_string());
            }
        };
        pages_fetched += 1;

        if parsed.results.is_empty() {
            break StopReason::EmptyPage;
        }
        standings.extend(parsed.results);

        if !parsed.has_next {
            break StopReason::Exhausted;
        }
        page += 1;
    };

    tracing::debug!(league_id, pages_fetched, managers = standings.len(), ?stop, "league paginated");

    LeagueStandings {
        league_id,
        standings,
        pages_fetched,
        stop,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::SyncError;
    use crate::upstream::testutils::{ScriptedFetcher, standings_page};

    fn ids(result: &LeagueStandings) -> Vec<i64> {
        result.standings.iter().map(|s| s.manager_id.get()).collect()
    }

    #[tokio::test]
    async fn empty_league_returns_empty_sequence() {
        let fetcher = ScriptedFetcher::new().with(
            standings_path(5, 1),
            Ok(standings_page(&[], 1, false)),
        );

        let result = fetch_all_pages(&fetcher, 5, 100).await;

        assert!(result.standings.is_empty());
        assert_eq!(result.stop, StopReason::EmptyPage);
        assert!(result.stop.is_complete());
    }

    #[tokio::test]
    async fn failure_on_fourth_page_keeps_first_three() {
        let fetcher = ScriptedFetcher::new()
            .with(standings_path(9, 1), Ok(standings_page(&[(1, 1, 90), (2, 2, 80)], 1, true)))
            .with(standings_path(9, 2), Ok(standings_page(&[(3, 3, 70)], 2, true)))
            .with(standings_path(9, 3), Ok(standings_page(&[(4, 4, 60)], 3, true)))
            .with(
                standings_path(9, 4),
                Err(SyncError::UpstreamHttp {
                    status: 503,
                    path: standings_path(9, 4),
                }),
            );

        let result = fetch_all_pages(&fetcher, 9, 100).await;

        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
        assert_eq!(result.pages_fetched, 3);
        assert!(matches!(result.stop, StopReason::UpstreamFailure(_)));
        assert!(!result.stop.is_complete());
    }

    #[tokio::test]
    async fn stops_when_has_next_is_false() {
        let fetcher = ScriptedFetcher::new().with_league(7, &[&[(1, 1, 9), (2, 2, 8)], &[(3, 3, 7)]]);

        let result = fetch_all_pages(&fetcher, 7, 100).await;

        assert_eq!(ids(&result), vec![1, 2, 3]);
        assert_eq!(result.stop, StopReason::Exhausted);
        assert_eq!(
            fetcher.requests(),
            vec![standings_path(7, 1), standings_path(7, 2)]
        );
    }

    #[tokio::test]
    async fn empty_page_ends_walk_despite_has_next() {
        let fetcher = ScriptedFetcher::new()
            .with(standings_path(3, 1), Ok(standings_page(&[(1, 1, 9)], 1, true)))
            .with(standings_path(3, 2), Ok(standings_page(&[], 2, true)));

        let result = fetch_all_pages(&fetcher, 3, 100).await;

        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.stop, StopReason::EmptyPage);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn malformed_page_keeps_partial_results() {
        let fetcher = ScriptedFetcher::new()
            .with(standings_path(3, 1), Ok(standings_page(&[(1, 1, 9)], 1, true)))
            .with(standings_path(3, 2), Ok(json!({ "standings": { "has_next": true } })));

        let result = fetch_all_pages(&fetcher, 3, 100).await;

        assert_eq!(ids(&result), vec![1]);
        assert!(matches!(result.stop, StopReason::Malformed(_)));
    }

    #[tokio::test]
    async fn page_limit_bounds_endless_upstream() {
        let fetcher = ScriptedFetcher::new()
            .with(standings_path(2, 1), Ok(standings_page(&[(1, 1, 9)], 1, true)))
            .with(standings_path(2, 2), Ok(standings_page(&[(2, 2, 8)], 2, true)));

        let result = fetch_all_pages(&fetcher, 2, 2).await;

        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(result.stop, StopReason::PageLimit);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn first_page_failure_yields_empty_not_error() {
        let fetcher = ScriptedFetcher::new();

        let result = fetch_all_pages(&fetcher, 11, 100).await;

        assert!(result.standings.is_empty());
        assert_eq!(result.pages_fetched, 0);
        assert!(matches!(result.stop, StopReason::UpstreamFailure(_)));
    }
}
