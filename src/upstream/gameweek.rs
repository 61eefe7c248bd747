//! Detection of the current gameweek from the bootstrap document.
//!
//! Never fails: when detection is impossible the configured fallback is
//! used, and the fallback is logged and reported, never silent.

use super::FetchJson;
use super::models::{BOOTSTRAP_PATH, BootstrapResponse, EventDescriptor};

/// Outcome of gameweek detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameweekResolution {
    /// Gameweek to sync.
    pub gameweek: i32,
    /// `false` when `gameweek` is the fallback value.
    pub detected: bool,
}

/// Returns the id of the first descriptor flagged current.
#[must_use]
pub fn find_current(events: &[EventDescriptor]) -> Option<i32> {
    events.iter().find(|e| e.is_current).map(|e| e.id)
}

/// Fetches `bootstrap-static/` and picks the current gameweek, or
/// `fallback` when the fetch fails, the body is malformed, or no event
/// is flagged current.
pub async fn resolve_current_gameweek<F: FetchJson>(
    fetcher: &F,
    fallback: i32,
) -> GameweekResolution {
    let reason = match fetcher.fetch_json(BOOTSTRAP_PATH).await {
        Ok(body) => match serde_json::from_value::<BootstrapResponse>(body) {
            Ok(bootstrap) => match find_current(&bootstrap.events) {
                Some(gameweek) => {
                    return GameweekResolution {
                        gameweek,
                        detected: true,
                    };
                }
                None if bootstrap.events.is_empty() => "no events listed".to_string(),
                None => "no event flagged current".to_string(),
            },
            Err(err) => format!("malformed bootstrap: {err}"),
        },
        Err(err) => err.to_string(),
    };

    tracing::warn!(fallback, %reason, "current gameweek not detected, using fallback");
    GameweekResolution {
        gameweek: fallback,
        detected: false,
    }
}

/// Gameweek number only; see [`resolve_current_gameweek`].
pub async fn current_gameweek<F: FetchJson>(fetcher: &F, fallback: i32) -> i32 {
    resolve_current_gameweek(fetcher, fallback).await.gameweek
}
