//! Step-by-step dependency probe.
//!
//! Walks config → store connectivity → upstream reachability → store
//! write/read round trip, stopping at the first failing step.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::SyncService;
use crate::error::SyncError;
use crate::upstream::FetchJson;
use crate::upstream::gameweek::find_current;
use crate::upstream::models::{BOOTSTRAP_PATH, BootstrapResponse};

/// A dependency checked by the probe, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStep {
    /// Store credentials and league ids are present.
    Config,
    /// The store answers a trivial query.
    StoreConnectivity,
    /// The upstream bootstrap document can be fetched.
    UpstreamReachability,
    /// A probe row can be written and read back.
    WriteReadRoundTrip,
}

impl DiagnosticStep {
    /// Wire name of the step.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::StoreConnectivity => "store_connectivity",
            Self::UpstreamReachability => "upstream_reachability",
            Self::WriteReadRoundTrip => "write_read_round_trip",
        }
    }
}

impl fmt::Display for DiagnosticStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Which step ran.
    pub step: DiagnosticStep,
    /// Whether it passed.
    pub ok: bool,
    /// What was observed, or the error message.
    pub detail: String,
}

/// Every step that ran, plus the first failure if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Steps in execution order.
    pub steps: Vec<StepOutcome>,
    /// First failing step and its message.
    pub failure: Option<(DiagnosticStep, String)>,
}

impl DiagnosticReport {
    /// `true` when every step passed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn pass(&mut self, step: DiagnosticStep, detail: String) {
        self.steps.push(StepOutcome {
            step,
            ok: true,
            detail,
        });
    }

    fn fail(mut self, step: DiagnosticStep, err: &SyncError) -> Self {
        tracing::warn!(%step, error = %err, "diagnostic step failed");
        self.steps.push(StepOutcome {
            step,
            ok: false,
            detail: err.to_string(),
        });
        self.failure = Some((step, err.to_string()));
        self
    }
}

/// Runs the probe against a configured pipeline, or reports the
/// configuration failure that prevented building one.
pub async fn run_diagnostics<F: FetchJson>(
    service: Result<&SyncService<F>, SyncError>,
) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    let service = match service {
        Ok(service) => service,
        Err(err) => return report.fail(DiagnosticStep::Config, &err),
    };
    report.pass(
        DiagnosticStep::Config,
        format!(
            "store configured, primary league {} plus {} secondary",
            service.leagues().primary.id,
            service.leagues().secondary.len()
        ),
    );

    if let Err(err) = service.store().ping().await {
        return report.fail(DiagnosticStep::StoreConnectivity, &err);
    }
    report.pass(DiagnosticStep::StoreConnectivity, "store reachable".to_string());

    match service.fetcher().fetch_json(BOOTSTRAP_PATH).await {
        Ok(body) => {
            let current = serde_json::from_value::<BootstrapResponse>(body)
                .ok()
                .and_then(|b| find_current(&b.events));
            let detail = match current {
                Some(gameweek) => format!("upstream reachable, current gameweek {gameweek}"),
                None => "upstream reachable, no current gameweek flagged".to_string(),
            };
            report.pass(DiagnosticStep::UpstreamReachability, detail);
        }
        Err(err) => return report.fail(DiagnosticStep::UpstreamReachability, &err),
    }

    if let Err(err) = service.store().round_trip().await {
        return report.fail(DiagnosticStep::WriteReadRoundTrip, &err);
    }
    report.pass(
        DiagnosticStep::WriteReadRoundTrip,
        "probe row written and read back".to_string(),
    );

    report
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{League, LeagueSet};
    use crate::persistence::{MemoryStore, Store};
    use crate::service::SyncSettings;
    use crate::upstream::testutils::ScriptedFetcher;

    fn service(fetcher: ScriptedFetcher) -> SyncService<ScriptedFetcher> {
        SyncService::new(
            fetcher,
            Store::Memory(MemoryStore::new()),
            LeagueSet {
                primary: League {
                    label: "classic".to_string(),
                    id: 1,
                },
                secondary: vec![League {
                    label: "h2h".to_string(),
                    id: 2,
                }],
            },
            SyncSettings {
                max_pages: 10,
                fallback_gameweek: 1,
                deadline: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn all_steps_pass() {
        let service = service(ScriptedFetcher::new().with_current_gameweek(9));

        let report = run_diagnostics(Ok(&service)).await;

        assert!(report.is_success());
        let steps: Vec<DiagnosticStep> = report.steps.iter().map(|s| s.step).collect();
        assert_eq!(
            steps,
            vec![
                DiagnosticStep::Config,
                DiagnosticStep::StoreConnectivity,
                DiagnosticStep::UpstreamReachability,
                DiagnosticStep::WriteReadRoundTrip,
            ]
        );
        assert!(
            report
                .steps
                .iter()
                .any(|s| s.detail.contains("current gameweek 9"))
        );
    }

    #[tokio::test]
    async fn config_failure_stops_immediately() {
        let report = run_diagnostics::<ScriptedFetcher>(Err(SyncError::Config(
            "DATABASE_URL is not set".to_string(),
        )))
        .await;

        assert!(!report.is_success());
        assert_eq!(report.steps.len(), 1);
        let Some((step, message)) = report.failure else {
            panic!("expected failure");
        };
        assert_eq!(step, DiagnosticStep::Config);
        assert!(message.contains("DATABASE_URL"));
    }

    #[tokio::test]
    async fn unreachable_upstream_names_its_step() {
        let service = service(ScriptedFetcher::new());

        let report = run_diagnostics(Ok(&service)).await;

        assert_eq!(
            report.failure.map(|(step, _)| step),
            Some(DiagnosticStep::UpstreamReachability)
        );
        assert_eq!(report.steps.len(), 3);
    }
}
