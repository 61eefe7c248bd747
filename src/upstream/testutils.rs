//! Scripted in-process upstream for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use super::FetchJson;
use super::models::{BOOTSTRAP_PATH, standings_path};
use crate::error::SyncError;

/// Answers from a fixed path → response table and records every request.
/// Unknown paths answer HTTP 404.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Result<Value, SyncError>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, response: Result<Value, SyncError>) -> Self {
        self.responses.insert(path.into(), response);
        self
    }

    /// Scripts a league as consecutive standings pages of `(id, rank, total)`.
    pub fn with_league(mut self, league_id: i64, pages: &[&[(i64, i32, i32)]]) -> Self {
        let count = pages.len();
        for (index, rows) in pages.iter().enumerate() {
            let page = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let body = standings_page(rows, page, index + 1 < count);
            self.responses
                .insert(standings_path(league_id, page), Ok(body));
        }
        self
    }

    pub fn with_current_gameweek(self, gameweek: i32) -> Self {
        self.with(
            BOOTSTRAP_PATH,
            Ok(json!({ "events": [
                { "id": gameweek - 1, "is_current": false },
                { "id": gameweek, "is_current": true }
            ]})),
        )
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

pub fn standings_page(rows: &[(i64, i32, i32)], page: u32, has_next: bool) -> Value {
    let results: Vec<Value> = rows
        .iter()
        .map(|(id, rank, total)| {
            json!({
                "entry": id,
                "player_name": format!("Player {id}"),
                "entry_name": format!("Team {id}"),
                "event_total": 0,
                "total": total,
                "rank": rank,
                "last_rank": rank
            })
        })
        .collect();
    json!({
        "league": { "id": 0, "name": "test" },
        "standings": { "has_next": has_next, "page": page, "results": results }
    })
}

pub fn not_found(path: &str) -> SyncError {
    SyncError::UpstreamHttp {
        status: 404,
        path: path.to_string(),
    }
}

impl FetchJson for ScriptedFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, SyncError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }
        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(not_found(path)))
    }
}
