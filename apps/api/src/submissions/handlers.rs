use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::Assessment;
use crate::models::submission::Submission;
use crate::state::AppState;
use crate::submissions::intake::{start_assessment, submit_and_schedule, SubmitRequest};

#[derive(Deserialize)]
pub struct CandidateQuery {
    pub candidate_id: Uuid,
}

/// POST /api/v1/submissions
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let submission = submit_and_schedule(state.store.as_ref(), state.queue.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// POST /api/v1/submissions/start/:application_id
pub async fn handle_start(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<CandidateQuery>,
) -> Result<Json<Value>, AppError> {
    let started_at = start_assessment(state.store.as_ref(), application_id, req.candidate_id).await?;
    Ok(Json(json!({
        "message": "Assessment started",
        "started_at": started_at,
    })))
}

/// GET /api/v1/submissions/:id?candidate_id=
pub async fn handle_get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CandidateQuery>,
) -> Result<Json<Submission>, AppError> {
    let submission = state
        .store
        .submission(id)
        .await?
        .filter(|s| s.candidate_id == params.candidate_id)
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
    Ok(Json(submission))
}

/// GET /api/v1/assessments/:id
/// Candidate-facing: answer keys and hidden test cases are stripped.
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Assessment>, AppError> {
    let assessment = state
        .store
        .assessment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    Ok(Json(assessment.candidate_view()))
}
