use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::types::Config;
use crate::orchestrator::{self, execute_run, Outcome, RunReport, SkipReason};
use crate::run::{GenerationRun, OutputMode};

/// Shared state for the trigger API.
pub struct AppState {
    pub config: Arc<Config>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// POST /api/generate request body. Mirrors the CLI run flags.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default = "default_sources")]
    pub sources: String,
    #[serde(default = "default_scenarios")]
    pub scenarios: String,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// When true, write to the durable output tree instead of scratch.
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_sources() -> String {
    "all".to_string()
}

fn default_scenarios() -> String {
    "none".to_string()
}

fn default_days() -> u32 {
    7
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: &'static str,
    pub message: String,
    pub outcomes: BTreeMap<String, OutcomeInfo>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeInfo {
    pub state: &'static str,
    pub events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeInfo {
    fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Ok { events, .. } => OutcomeInfo {
                state: "ok",
                events: *events,
                error: None,
            },
            Outcome::Failed { error } => OutcomeInfo {
                state: "failed",
                events: 0,
                error: Some(error.clone()),
            },
            Outcome::Skipped {
                reason: SkipReason::FailedDependency(dep),
            } => OutcomeInfo {
                state: "skipped",
                events: 0,
                error: Some(format!("dependency '{dep}' failed")),
            },
            Outcome::Skipped {
                reason: SkipReason::Interrupted,
            } => OutcomeInfo {
                state: "skipped",
                events: 0,
                error: Some("interrupted".to_string()),
            },
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// POST /api/generate
///
/// Runs the orchestrator in-process and returns once every generator has
/// finished. Long runs are the caller's problem; there is no server-side
/// timeout.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let run = GenerationRun {
        start_date: request
            .start_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        days: request.days,
        scale: request.scale,
        sources: orchestrator::resolve_sources(&request.sources),
        scenarios: orchestrator::resolve_scenarios(&request.scenarios),
        output_mode: if request.durable {
            OutputMode::Durable
        } else {
            OutputMode::Scratch
        },
        workers: request
            .workers
            .unwrap_or_else(|| state.config.orchestrator.effective_workers()),
        show_files: false,
    };

    let report = execute_run(state.config.clone(), run, state.shutdown_rx.clone())
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(build_response(&report)))
}

fn build_response(report: &RunReport) -> GenerateResponse {
    let outcomes: BTreeMap<String, OutcomeInfo> = report
        .outcomes
        .iter()
        .map(|(id, outcome)| (id.clone(), OutcomeInfo::from_outcome(outcome)))
        .collect();

    let failed = report.failed_count();
    if report.all_ok() {
        GenerateResponse {
            status: "success",
            message: format!(
                "{} generators produced {} events",
                outcomes.len(),
                report.total_events()
            ),
            outcomes,
        }
    } else {
        GenerateResponse {
            status: "error",
            message: format!("{failed} generator(s) failed"),
            outcomes,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
