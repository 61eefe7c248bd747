//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::service::SyncService;
use crate::upstream::UpstreamClient;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The sync pipeline is held as a `Result`: when store credentials or
/// league ids are missing the service still starts, and every trigger
/// reports the recorded [`SyncError::Config`] instead of crashing.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<SyncConfig>,
    /// Upstream client, also used directly by the proxy.
    pub upstream: UpstreamClient,
    sync: Result<Arc<SyncService>, SyncError>,
}

impl AppState {
    /// Assembles state from already-built parts.
    #[must_use]
    pub const fn new(
        config: Arc<SyncConfig>,
        upstream: UpstreamClient,
        sync: Result<Arc<SyncService>, SyncError>,
    ) -> Self {
        Self {
            config,
            upstream,
            sync,
        }
    }

    /// Builds state from configuration, recording (not raising)
    /// pipeline initialization failures.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] only if the upstream client itself
    /// cannot be built.
    pub fn from_config(config: SyncConfig) -> Result<Self, SyncError> {
        let upstream = UpstreamClient::from_config(&config)?;
        let sync = SyncService::from_config(&config, upstream.clone()).map(Arc::new);
        if let Err(err) = &sync {
            tracing::error!(error = %err, "sync pipeline unavailable; triggers will report it");
        }
        Ok(Self::new(Arc::new(config), upstream, sync))
    }

    /// The sync pipeline, or the initialization error that prevented it.
    ///
    /// # Errors
    ///
    /// Returns the recorded [`SyncError::Config`].
    pub fn sync_service(&self) -> Result<&Arc<SyncService>, SyncError> {
        self.sync.as_ref().map_err(Clone::clone)
    }
}
