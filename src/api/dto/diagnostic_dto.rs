//! Diagnostic probe response body.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{DiagnosticReport, DiagnosticStep};

/// Response body of `GET /api/diagnostic`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResponse {
    /// `true` only if every step passed.
    pub success: bool,
    /// Steps that ran, in order.
    pub steps: Vec<DiagnosticStepDto>,
    /// First failing step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<DiagnosticStep>,
    /// Message of the first failing step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One probe step.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticStepDto {
    /// Step name.
    pub step: DiagnosticStep,
    /// Whether it passed.
    pub ok: bool,
    /// Observation or error message.
    pub detail: String,
}

impl From<DiagnosticReport> for DiagnosticResponse {
    fn from(report: DiagnosticReport) -> Self {
        let (failed_step, error) = match report.failure {
            Some((step, message)) => (Some(step), Some(message)),
            None => (None, None),
        };
        Self {
            success: failed_step.is_none(),
            steps: report
                .steps
                .into_iter()
                .map(|s| DiagnosticStepDto {
                    step: s.step,
                    ok: s.ok,
                    detail: s.detail,
                })
                .collect(),
            failed_step,
            error,
        }
    }
}
