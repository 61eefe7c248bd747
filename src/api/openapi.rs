//! OpenAPI document for every HTTP endpoint.

use utoipa::OpenApi;

use crate::api::dto::{
    DiagnosticResponse, DiagnosticStepDto, GameweekResponse, LeagueSummaryDto,
    ProxyErrorResponse, SnapshotDto, SnapshotListResponse, SyncResponse,
};
use crate::api::handlers::{diagnostic, proxy, snapshots, system, trigger};
use crate::error::ErrorResponse;
use crate::service::DiagnosticStep;

/// Aggregated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "fpl-league-sync",
        description = "Syncs fantasy mini-league standings into PostgreSQL and exposes trigger, probe, and proxy endpoints."
    ),
    paths(
        trigger::scheduled_sync,
        trigger::manual_sync,
        diagnostic::diagnostic,
        proxy::proxy,
        snapshots::get_gameweek,
        snapshots::list_snapshots,
        system::health_handler,
    ),
    components(schemas(
        SyncResponse,
        LeagueSummaryDto,
        DiagnosticResponse,
        DiagnosticStepDto,
        DiagnosticStep,
        GameweekResponse,
        SnapshotDto,
        SnapshotListResponse,
        ProxyErrorResponse,
        ErrorResponse,
        system::HealthResponse,
    )),
    tags(
        (name = "Sync", description = "Scheduled and manual sync triggers"),
        (name = "Diagnostics", description = "Step-by-step health probe"),
        (name = "Proxy", description = "Passthrough to the upstream API"),
        (name = "Snapshots", description = "Stored standings"),
        (name = "System", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/cron/sync",
            "/api/sync",
            "/api/diagnostic",
            "/api/proxy",
            "/api/v1/gameweek",
            "/api/v1/snapshots/{gameweek}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
