use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::result::ResultRecord;
use crate::results::decision::{decide, Decision};
use crate::results::ranking::{rank_job, result_for_application, RankedResult};
use crate::state::AppState;

fn default_limit() -> usize {
    100
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// GET /api/v1/results/application/:application_id
pub async fn handle_result_for_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ResultRecord>, AppError> {
    let result = result_for_application(state.store.as_ref(), application_id).await?;
    Ok(Json(result))
}

/// GET /api/v1/results/job/:job_id/rankings?skip=&limit=
pub async fn handle_job_rankings(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<RankedResult>>, AppError> {
    let ranked = rank_job(state.store.as_ref(), job_id, page.skip, page.limit).await?;
    Ok(Json(ranked))
}

/// POST /api/v1/applications/:id/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(decide(state.store.as_ref(), id, Decision::Shortlist).await?))
}

/// POST /api/v1/applications/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(decide(state.store.as_ref(), id, Decision::Reject).await?))
}
