//! # fpl-league-sync
//!
//! Keeps a PostgreSQL table of fantasy mini-league standings in step with
//! the upstream fantasy API.
//!
//! A sync resolves the current gameweek, pages through the primary
//! league and every secondary league concurrently, joins the secondary
//! ranks onto the primary list by manager id, and upserts one row per
//! manager and gameweek. Pagination failures truncate a league instead of
//! failing the run; storage failures fail it.
//!
//! ## Architecture
//!
//! ```text
//! Triggers (scheduled, manual, interval task)   Probe   Proxy
//!     │                                            │       │
//!     ├── HTTP Handlers (api/)  ───────────────────┘       │
//!     │                                                    │
//!     ├── SyncService (service/)                           │
//!     │     ├── Gameweek resolver ─┐                       │
//!     │     ├── Paginator ─────────┼── UpstreamClient (upstream/)
//!     │     ├── Reconciler (domain/)
//!     │     │
//!     └── Store (persistence/)
//!           ├── PostgreSQL
//!           └── In-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod upstream;
