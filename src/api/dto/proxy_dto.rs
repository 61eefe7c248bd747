//! Passthrough proxy query and error body.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters of `GET /api/proxy`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ProxyQuery {
    /// Upstream resource path, relative to the API root
    /// (e.g. `leagues-classic/314/standings/?page_standings=1`).
    #[serde(default)]
    pub path: Option<String>,
}

/// Error body of the proxy endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProxyErrorResponse {
    /// Short description.
    pub error: String,
    /// Underlying upstream error, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
