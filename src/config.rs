//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Malformed values are startup errors;
//! missing store credentials or league ids are not. They surface as
//! [`SyncError::Config`] from [`SyncConfig::store_credentials`] and
//! [`SyncConfig::league_set`] so triggers can report them.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SyncError;

/// Default root of the Fantasy Premier League API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://fantasy.premierleague.com/api";

/// Default `User-Agent`. The upstream rejects requests without a
/// browser-like identification.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Gameweek used when the current one cannot be detected upstream.
pub const DEFAULT_FALLBACK_GAMEWEEK: i32 = 1;

/// Top-level service configuration.
///
/// Loaded once at startup via [`SyncConfig::from_env`].
#[derive(Clone)]
pub struct SyncConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL connection string.
    pub database_url: Option<String>,

    /// Store access key, applied as the connection password.
    pub database_key: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Shared secret expected on the scheduled trigger.
    pub cron_secret: Option<String>,

    /// Classic (primary) league id.
    pub primary_league_id: Option<i64>,

    /// Secondary leagues as `(label, id)` pairs.
    pub secondary_leagues: Vec<(String, i64)>,

    /// Root URL of the upstream API.
    pub upstream_base_url: String,

    /// `User-Agent` sent to the upstream API.
    pub upstream_user_agent: String,

    /// Per-request upstream timeout in seconds.
    pub upstream_timeout_secs: u64,

    /// Safety cap on pages fetched for a single league.
    pub upstream_max_pages: u32,

    /// Deadline in seconds for one complete sync.
    pub sync_deadline_secs: u64,

    /// Gameweek used when detection fails.
    pub fallback_gameweek: i32,

    /// Seconds between in-process sync runs (0 = disabled).
    pub sync_interval_secs: u64,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("database_key", &self.database_key.as_ref().map(|_| "<redacted>"))
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "<redacted>"))
            .field("primary_league_id", &self.primary_league_id)
            .field("secondary_leagues", &self.secondary_leagues)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("upstream_max_pages", &self.upstream_max_pages)
            .field("sync_deadline_secs", &self.sync_deadline_secs)
            .field("fallback_gameweek", &self.fallback_gameweek)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .finish_non_exhaustive()
    }
}

/// Connection settings for the data store.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    /// PostgreSQL connection string.
    pub url: String,
    /// Access key (password) for the connection.
    pub key: String,
}

/// A tracked league with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    /// Short label used as key in the stored rank map.
    pub label: String,
    /// Upstream league id.
    pub id: i64,
}

/// The primary league plus its secondary leagues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSet {
    /// League whose members define the snapshot rows.
    pub primary: League,
    /// Leagues whose ranks are joined onto the primary rows.
    pub secondary: Vec<League>,
}

impl SyncConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if any variable is set but cannot be
    /// parsed, numeric tunables included.
    pub fn from_env() -> Result<Self, SyncError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| SyncError::Config(format!("invalid LISTEN_ADDR: {e}")))?;

        let primary_league_id = match non_empty_env("PRIMARY_LEAGUE_ID") {
            Some(raw) => Some(parse_league_id("PRIMARY_LEAGUE_ID", &raw)?),
            None => None,
        };
        let secondary_leagues = match non_empty_env("SECONDARY_LEAGUES") {
            Some(raw) => parse_secondary_leagues(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            listen_addr,
            database_url: non_empty_env("DATABASE_URL"),
            database_key: non_empty_env("DATABASE_KEY"),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            database_min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 0)?,
            database_connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5)?,
            cron_secret: non_empty_env("CRON_SECRET"),
            primary_league_id,
            secondary_leagues,
            upstream_base_url: non_empty_env("UPSTREAM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            upstream_user_agent: non_empty_env("UPSTREAM_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 10)?,
            upstream_max_pages: parse_env("UPSTREAM_MAX_PAGES", 1000)?,
            sync_deadline_secs: parse_env("SYNC_DEADLINE_SECS", 120)?,
            fallback_gameweek: parse_env("FALLBACK_GAMEWEEK", DEFAULT_FALLBACK_GAMEWEEK)?,
            sync_interval_secs: parse_env("SYNC_INTERVAL_SECS", 0)?,
        })
    }

    /// Configuration with defaults and nothing required set. Used as a
    /// starting point by tests and embedders.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            database_key: None,
            database_max_connections: 5,
            database_min_connections: 0,
            database_connect_timeout_secs: 5,
            cron_secret: None,
            primary_league_id: None,
            secondary_leagues: Vec::new(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout_secs: 10,
            upstream_max_pages: 1000,
            sync_deadline_secs: 120,
            fallback_gameweek: DEFAULT_FALLBACK_GAMEWEEK,
            sync_interval_secs: 0,
        }
    }

    /// Returns the store connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] naming every missing variable.
    pub fn store_credentials(&self) -> Result<StoreCredentials, SyncError> {
        match (&self.database_url, &self.database_key) {
            (Some(url), Some(key)) => Ok(StoreCredentials {
                url: url.clone(),
                key: key.clone(),
            }),
            (None, None) => Err(SyncError::Config(
                "DATABASE_URL and DATABASE_KEY are not set".to_string(),
            )),
            (None, Some(_)) => Err(SyncError::Config("DATABASE_URL is not set".to_string())),
            (Some(_), None) => Err(SyncError::Config("DATABASE_KEY is not set".to_string())),
        }
    }

    /// Returns the tracked leagues.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if `PRIMARY_LEAGUE_ID` or
    /// `SECONDARY_LEAGUES` is missing.
    pub fn league_set(&self) -> Result<LeagueSet, SyncError> {
        let primary_id = self
            .primary_league_id
            .ok_or_else(|| SyncError::Config("PRIMARY_LEAGUE_ID is not set".to_string()))?;
        if self.secondary_leagues.is_empty() {
            return Err(SyncError::Config("SECONDARY_LEAGUES is not set".to_string()));
        }
        Ok(LeagueSet {
            primary: League {
                label: "classic".to_string(),
                id: primary_id,
            },
            secondary: self
                .secondary_leagues
                .iter()
                .map(|(label, id)| League {
                    label: label.clone(),
                    id: *id,
                })
                .collect(),
        })
    }

    /// Per-request upstream timeout.
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Deadline for one complete sync.
    #[must_use]
    pub const fn sync_deadline(&self) -> Duration {
        Duration::from_secs(self.sync_deadline_secs)
    }
}

/// Parses `SECONDARY_LEAGUES` in the form `label:id,label:id`.
///
/// # Errors
///
/// Returns [`SyncError::Config`] on an empty label, a non-numeric id, or
/// a duplicated label.
pub fn parse_secondary_leagues(raw: &str) -> Result<Vec<(String, i64)>, SyncError> {
    let mut leagues: Vec<(String, i64)> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (label, id) = item.split_once(':').ok_or_else(|| {
            SyncError::Config(format!("SECONDARY_LEAGUES entry `{item}` is not label:id"))
        })?;
        let label = label.trim();
        if label.is_empty() {
            return Err(SyncError::Config(format!(
                "SECONDARY_LEAGUES entry `{item}` has an empty label"
            )));
        }
        if leagues.iter().any(|(existing, _)| existing == label) {
            return Err(SyncError::Config(format!(
                "SECONDARY_LEAGUES label `{label}` is repeated"
            )));
        }
        leagues.push((label.to_string(), parse_league_id("SECONDARY_LEAGUES", id)?));
    }
    Ok(leagues)
}

fn parse_league_id(key: &str, raw: &str) -> Result<i64, SyncError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| SyncError::Config(format!("{key}: `{raw}` is not a league id")))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable as `T`, returning `default` when it is
/// unset or blank.
fn parse_env<T>(key: &str, default: T) -> Result<T, SyncError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_setting(key, non_empty_env(key).as_deref(), default)
}

fn parse_setting<T>(key: &str, raw: Option<&str>, default: T) -> Result<T, SyncError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| SyncError::Config(format!("invalid {key}: `{value}` ({e})"))),
    }
}
