//! Domain layer: manager identity, standings, snapshots, reconciliation.
//!
//! Everything here is pure data and pure functions. Network access lives
//! in [`crate::upstream`], storage in [`crate::persistence`].

pub mod manager_id;
pub mod reconciler;
pub mod snapshot;
pub mod standing;

pub use manager_id::ManagerId;
pub use reconciler::reconcile;
pub use snapshot::{GameweekMarker, ManagerSnapshot};
pub use standing::ManagerStanding;
