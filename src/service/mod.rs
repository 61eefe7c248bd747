//! Service layer: sync orchestration, diagnostics, and scheduling.
//!
//! [`SyncService`] is the single pipeline every trigger runs. It takes the
//! upstream source and the store as explicit parts instead of reaching for
//! process-wide handles.

pub mod diagnostics;
pub mod scheduler;
pub mod sync_service;

pub use diagnostics::{DiagnosticReport, DiagnosticStep, run_diagnostics};
pub use scheduler::spawn_scheduler;
pub use sync_service::{LeagueReport, SyncReport, SyncService, SyncSettings};
