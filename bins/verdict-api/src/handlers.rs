// HTTP route handlers for the Verdict API

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use verdict_common::question::CodingQuestion;
use verdict_common::types::{
    visible_results, FunctionSignature, Language, ScoreRequest, ScoreResult, Submission, TestCase,
    TestCaseResult,
};
use verdict_harness::generator::{GenerateError, TypeHints};
use verdict_runtime::{score_submission, GradeError, RunError, ScoreError};

use crate::metrics;
use crate::AppState;

/// Error body: `{ "error": <code>, "message": <text> }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl ToString) -> Self {
        Self {
            status,
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<GenerateError> for ApiError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::SignatureRequired => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "signature_required", e)
            }
            GenerateError::UnsupportedStructure { .. } | GenerateError::UnsupportedOutput(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "unsupported_structure", e)
            }
            GenerateError::Template(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "generation_failed", e)
            }
        }
    }
}

impl From<RunError> for ApiError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Generate(inner) => inner.into(),
            RunError::InvalidTestCase(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_test_case", e)
            }
            RunError::UnknownLanguage(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "unknown_language", e)
            }
            RunError::GradingTimedOut(_) => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "grading_timed_out", e)
            }
            RunError::IncompleteResults { .. } => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "incomplete_results", e)
            }
        }
    }
}

impl From<ScoreError> for ApiError {
    fn from(e: ScoreError) -> Self {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_score_request", e)
    }
}

impl From<GradeError> for ApiError {
    fn from(e: GradeError) -> Self {
        match e {
            GradeError::Run(inner) => inner.into(),
            GradeError::Score(inner) => inner.into(),
            GradeError::Question(_) | GradeError::QuestionMismatch { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_question", e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub signature: FunctionSignature,
}

#[derive(Debug, Deserialize)]
pub struct StarterRequest {
    pub language: Language,
    pub signature: FunctionSignature,
    #[serde(default)]
    pub hints: TypeHints,
}

#[derive(Debug, Serialize)]
pub struct StarterResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct AllStarterRequest {
    pub primary_language: Language,
    pub primary_code: String,
    pub allowed_languages: Vec<Language>,
    #[serde(default)]
    pub hints: TypeHints,
}

#[derive(Debug, Serialize)]
pub struct AllStarterResponse {
    pub starter_code: BTreeMap<Language, String>,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub language: Language,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub function_name: Option<String>,
}

/// Visible results only; hidden cases are reported as counts.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub results: Vec<TestCaseResult>,
    pub passed_count: usize,
    pub total_count: usize,
    pub hidden_passed: usize,
    pub hidden_total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub question: CodingQuestion,
    pub submission: Submission,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub submission_id: Uuid,
    pub score: ScoreResult,
    pub results: Vec<TestCaseResult>,
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

/// POST /signature/detect
pub async fn detect_signature(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    let signature = state.grader.runner().generator().detect_signature(&payload.text)?;
    info!(function = %signature.name, params = signature.parameters.len(), "Signature detected");
    Ok(Json(DetectResponse { signature }))
}

/// POST /starter
pub async fn starter_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StarterRequest>,
) -> Result<Json<StarterResponse>, ApiError> {
    let code = state.grader.runner().generator().starter_code(
        payload.language,
        &payload.signature,
        &payload.hints,
    )?;
    Ok(Json(StarterResponse { code }))
}

/// POST /starter/all
pub async fn all_starter_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AllStarterRequest>,
) -> Result<Json<AllStarterResponse>, ApiError> {
    let starter_code = state.grader.runner().generator().all_starter_code(
        payload.primary_language,
        &payload.primary_code,
        payload.allowed_languages,
        &payload.hints,
    )?;
    Ok(Json(AllStarterResponse { starter_code }))
}

/// POST /run - Execute every test case, return what the test taker may see
pub async fn run_test_cases(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let timer = metrics::GRADING_DURATION.start_timer();
    let outcome = state
        .grader
        .runner()
        .run_test_cases(
            &payload.code,
            payload.language,
            &payload.test_cases,
            payload.function_name.as_deref(),
        )
        .await;
    timer.observe_duration();

    let results = outcome.map_err(|e| {
        warn!(language = %payload.language, error = %e, "Run failed");
        ApiError::from(e)
    })?;
    metrics::record_results(&results);

    let hidden: Vec<_> = results.iter().filter(|r| r.is_hidden).collect();
    Ok(Json(RunResponse {
        passed_count: results.iter().filter(|r| r.passed).count(),
        total_count: results.len(),
        hidden_passed: hidden.iter().filter(|r| r.passed).count(),
        hidden_total: hidden.len(),
        results: visible_results(&results),
    }))
}

/// POST /score
pub async fn score(Json(payload): Json<ScoreRequest>) -> Result<Json<ScoreResult>, ApiError> {
    let result = score_submission(&payload)?;
    info!(
        question_id = %result.question_id,
        score = result.score,
        max_score = result.max_score,
        "Score computed"
    );
    Ok(Json(result))
}

/// POST /submit - Grade, score and persist a submission
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let timer = metrics::GRADING_DURATION.start_timer();
    let outcome = state
        .grader
        .grade(&payload.question, &payload.submission)
        .await;
    timer.observe_duration();

    let outcome = outcome.map_err(|e| {
        error!(question_id = %payload.question.id, error = %e, "Grading failed");
        ApiError::from(e)
    })?;
    metrics::record_results(&outcome.results);
    metrics::record_graded(payload.submission.language);

    Ok(Json(SubmitResponse {
        submission_id: outcome.submission_id,
        results: outcome.visible_results(),
        score: outcome.score,
    }))
}
