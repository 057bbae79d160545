// HTTP route handlers for the PrepJudge API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use prepjudge_common::types::{
    ExecutionRequest, ExecutionResult, PublicRunResult, PublicVerdict, TestCase,
};
use prepjudge_engine::language::{self, LanguageSpec};
use prepjudge_engine::JudgeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct JudgeRequest {
    #[serde(default = "default_language")]
    pub language: String,
    pub source_code: String,
    pub test_cases: Vec<TestCase>,
}

fn default_language() -> String {
    language::DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Judge errors surfaced over HTTP.
///
/// Malformed requests are the caller's fault; cancellation only happens
/// while the server is shutting down.
#[derive(Debug)]
pub struct ApiError(JudgeError);

impl From<JudgeError> for ApiError {
    fn from(err: JudgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            JudgeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        warn!(status = %status, error = %self.0, "Request rejected");
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /run - Run against the visible test cases
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JudgeRequest>,
) -> Result<Json<PublicRunResult>, ApiError> {
    let cancel = state.shutdown.child_token();

    let result = state
        .judge
        .run_test_cases(
            &payload.source_code,
            &payload.language,
            &payload.test_cases,
            &cancel,
        )
        .await?;

    metrics::record_judgement("run", result.overall_status, result.used_fallback());
    info!(
        language = %payload.language,
        status = %result.overall_status,
        passed = result.passed,
        total = result.total,
        "Run served"
    );

    Ok(Json(result.to_public()))
}

/// POST /submit - Grade against every test case
pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JudgeRequest>,
) -> Result<Json<PublicVerdict>, ApiError> {
    let cancel = state.shutdown.child_token();

    let verdict = state
        .judge
        .submit_code(
            &payload.source_code,
            &payload.language,
            &payload.test_cases,
            &cancel,
        )
        .await?;

    metrics::record_judgement("submit", verdict.overall_status, verdict.used_fallback());
    info!(
        language = %payload.language,
        status = %verdict.overall_status,
        score = verdict.score,
        "Submission served"
    );

    Ok(Json(verdict.to_public()))
}

/// POST /execute - Execute once with custom stdin
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecutionRequest>,
) -> Result<Json<ExecutionResult>, ApiError> {
    let cancel = state.shutdown.child_token();

    let result = state
        .judge
        .run_custom_input(
            &payload.source_code,
            &payload.language,
            &payload.stdin,
            &cancel,
        )
        .await?;

    if result.source.is_approximate() {
        metrics::record_fallback("execute");
    }

    Ok(Json(result))
}

/// GET /languages - Supported languages and their backend ids
pub async fn list_languages() -> Json<&'static [LanguageSpec]> {
    Json(language::supported_languages())
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics() -> Response {
    match metrics::render() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
