use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::result::ResultRecord;
use crate::store::HiringStore;

pub const NOT_YET_AVAILABLE: &str = "Result not yet available. Assessment is being evaluated.";

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: ResultRecord,
    pub candidate_name: String,
    pub candidate_email: String,
}

/// The stored result, or "not yet available" while evaluation is running.
/// Never a partial result.
pub async fn result_for_application(
    store: &dyn HiringStore,
    application_id: Uuid,
) -> Result<ResultRecord, AppError> {
    if store.application(application_id).await?.is_none() {
        return Err(AppError::NotFound("Application not found".to_string()));
    }
    store
        .result_for_application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_YET_AVAILABLE.to_string()))
}

/// Ranks a page of a job's results by percentage, best first.
///
/// Rank is the 1-based position across the whole job (so page two starts at
/// `skip + 1`); `total_candidates` counts every application for the job,
/// evaluated or not. Both are written back onto each returned result.
pub async fn rank_job(
    store: &dyn HiringStore,
    job_id: Uuid,
    skip: usize,
    limit: usize,
) -> Result<Vec<RankedResult>, AppError> {
    if store.job_title(job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let applications = store.applications_for_job(job_id).await?;
    let total_candidates = applications.len() as i64;
    let candidates: HashMap<Uuid, (&str, &str)> = applications
        .iter()
        .map(|a| (a.id, (a.candidate_name.as_str(), a.candidate_email.as_str())))
        .collect();

    let results = store.results_for_job(job_id).await?;
    let mut ranked = Vec::with_capacity(limit.min(results.len()));

    for (offset, mut result) in results.into_iter().skip(skip).take(limit).enumerate() {
        let rank = (skip + offset + 1) as i64;
        store.record_rank(result.id, rank, total_candidates).await?;
        result.rank = Some(rank);
        result.total_candidates = Some(total_candidates);

        let (name, email) = candidates
            .get(&result.application_id)
            .copied()
            .unwrap_or(("Unknown", ""));
        ranked.push(RankedResult {
            result,
            candidate_name: name.to_string(),
            candidate_email: email.to_string(),
        });
    }

    Ok(ranked)
}
