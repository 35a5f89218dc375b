//! Submission intake: accept a candidate's answers and schedule evaluation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::submission::{Answer, Submission};
use crate::queue::{EvaluationJob, JobQueue};
use crate::store::{HiringStore, InsertOutcome};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub application_id: Uuid,
    pub assessment_id: Uuid,
    pub candidate_id: Uuid,
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub is_practice: bool,
}

/// Loads the application, requiring it to belong to `candidate_id`.
async fn owned_application(
    store: &dyn HiringStore,
    application_id: Uuid,
    candidate_id: Uuid,
) -> Result<Application, AppError> {
    store
        .application(application_id)
        .await?
        .filter(|app| app.candidate_id == candidate_id)
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

/// Marks the assessment as started. Only an `applied` application can start.
pub async fn start_assessment(
    store: &dyn HiringStore,
    application_id: Uuid,
    candidate_id: Uuid,
) -> Result<DateTime<Utc>, AppError> {
    let application = owned_application(store, application_id, candidate_id).await?;
    let to = ApplicationStatus::AssessmentPending;
    if !application.status.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to,
        });
    }

    let started_at = Utc::now();
    if !store
        .transition_application(application_id, application.status, to, started_at)
        .await?
    {
        return Err(AppError::Conflict(
            "Application status changed concurrently".to_string(),
        ));
    }

    info!("Application {application_id} started its assessment");
    Ok(started_at)
}

/// Persists the submission, completes the assessment and enqueues exactly
/// one evaluation job. Returns without waiting for evaluation.
///
/// Practice submissions are stored only: no status change, no job, and
/// they never count against the one-final-submission rule.
pub async fn submit_and_schedule(
    store: &dyn HiringStore,
    queue: &dyn JobQueue,
    request: SubmitRequest,
) -> Result<Submission, AppError> {
    let application =
        owned_application(store, request.application_id, request.candidate_id).await?;

    if !request.is_practice && store.has_final_submission(application.id).await? {
        return Err(AppError::Conflict("Assessment already submitted".to_string()));
    }

    let assessment = store
        .assessment(request.assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;

    if assessment.job_id != application.job_id {
        return Err(AppError::Validation(
            "Assessment does not belong to the application's job".to_string(),
        ));
    }
    if request.is_practice && !assessment.config.allow_practice_mode {
        return Err(AppError::Validation(
            "Practice mode is disabled for this assessment".to_string(),
        ));
    }

    let completed = ApplicationStatus::AssessmentCompleted;
    if !request.is_practice && !application.status.can_transition_to(completed) {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to: completed,
        });
    }

    let now = Utc::now();
    let total_time_seconds = match application.assessment_started_at {
        Some(started) => (now - started).num_seconds().max(0),
        None => request
            .answers
            .iter()
            .map(|a| i64::from(a.time_spent_seconds))
            .sum(),
    };

    let submission = Submission {
        id: Uuid::new_v4(),
        application_id: application.id,
        assessment_id: assessment.id,
        candidate_id: request.candidate_id,
        answers: request.answers,
        started_at: application.assessment_started_at.unwrap_or(now),
        submitted_at: now,
        total_time_seconds,
        is_practice: request.is_practice,
    };

    // The partial unique index catches a concurrent second final submission.
    if store.insert_submission(&submission).await? == InsertOutcome::AlreadyExists {
        return Err(AppError::Conflict("Assessment already submitted".to_string()));
    }

    if submission.is_practice {
        info!("Practice submission {} stored", submission.id);
        return Ok(submission);
    }

    if !store
        .transition_application(application.id, application.status, completed, now)
        .await?
    {
        warn!(
            "Application {} left {} before submission {} completed it",
            application.id, application.status, submission.id
        );
    }

    if let Err(e) = queue.enqueue(&EvaluationJob::new(submission.id)).await {
        error!(
            "Could not schedule submission {}, rolling back intake: {e}",
            submission.id
        );
        unschedule(store, &submission, &application).await;
        return Err(e);
    }
    info!(
        "Submission {} accepted for application {}; evaluation scheduled",
        submission.id, application.id
    );
    Ok(submission)
}

/// Undoes an intake whose job never reached the queue, so the candidate can
/// submit again. Rollback errors are logged; the caller reports the enqueue
/// failure.
async fn unschedule(store: &dyn HiringStore, submission: &Submission, before: &Application) {
    if let Err(e) = store.delete_submission(submission.id).await {
        error!("Could not remove unscheduled submission {}: {e}", submission.id);
    }
    match store.restore_application(before).await {
        Ok(true) => {}
        Ok(false) => warn!(
            "Application {} moved on before intake rollback; status left as is",
            before.id
        ),
        Err(e) => error!("Could not restore application {}: {e}", before.id),
    }
}
