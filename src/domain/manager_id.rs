//! Type-safe manager identifier.
//!
//! [`ManagerId`] is a newtype wrapper around the upstream entry id so that
//! manager ids cannot be confused with league ids, ranks, or points.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of an FPL manager (the upstream `entry` field).
///
/// The same id appears in every league the manager belongs to, which makes
/// it the join key for reconciliation and half of the storage conflict key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerId(i64);

impl ManagerId {
    /// Wraps a raw upstream entry id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ManagerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ManagerId> for i64 {
    fn from(id: ManagerId) -> Self {
        id.0
    }
}
