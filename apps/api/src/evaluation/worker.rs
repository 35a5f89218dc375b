//! Queue worker: reserve a job, compose its result, ack or requeue.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::composer::{compose_for_submission, Composition};
use crate::evaluation::judge::{InsightProvider, JudgmentProvider};
use crate::queue::{EvaluationJob, JobQueue};
use crate::store::HiringStore;

/// Everything a worker needs to turn a job into a stored result.
pub struct Pipeline {
    pub store: Arc<dyn HiringStore>,
    pub judge: Arc<dyn JudgmentProvider>,
    pub insights: Arc<dyn InsightProvider>,
    /// Deadline for all external calls of one job.
    pub timeout: Duration,
}

/// Deliveries of one job before a transient failure becomes terminal.
pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed { result_id: Uuid },
    AlreadyEvaluated,
    /// Transient failure; the job goes back on the queue as `attempt`.
    Requeued { attempt: u32, reason: String },
    /// Not retried.
    Failed { reason: String },
}

/// Missing or invalid records will not fix themselves on redelivery.
fn is_terminal(error: &AppError) -> bool {
    matches!(
        error,
        AppError::NotFound(_)
            | AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::InvalidTransition { .. }
    )
}

pub async fn process_job(pipeline: &Pipeline, job: &EvaluationJob) -> JobOutcome {
    let outcome = compose_for_submission(
        pipeline.store.as_ref(),
        pipeline.judge.as_ref(),
        pipeline.insights.as_ref(),
        job.submission_id,
        pipeline.timeout,
    )
    .await;

    match outcome {
        Ok(Composition::Created(result)) => JobOutcome::Completed {
            result_id: result.id,
        },
        Ok(Composition::AlreadyEvaluated { .. }) => {
            info!("Submission {} already evaluated; duplicate job ignored", job.submission_id);
            JobOutcome::AlreadyEvaluated
        }
        Err(e) if !is_terminal(&e) && job.attempt + 1 < MAX_ATTEMPTS => {
            warn!(
                "Evaluation of submission {} failed on attempt {}, requeueing: {e}",
                job.submission_id,
                job.attempt + 1
            );
            JobOutcome::Requeued {
                attempt: job.attempt + 1,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            error!(
                "Evaluation of submission {} failed after {} attempt(s): {e}",
                job.submission_id,
                job.attempt + 1
            );
            JobOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Handles at most one job. `Ok(None)` when nothing arrived within `wait`.
pub async fn work_once(
    pipeline: &Pipeline,
    queue: &dyn JobQueue,
    wait: Duration,
) -> Result<Option<JobOutcome>, AppError> {
    let Some(reservation) = queue.reserve(wait).await? else {
        return Ok(None);
    };

    let outcome = process_job(pipeline, &reservation.job).await;
    if let JobOutcome::Requeued { attempt, .. } = &outcome {
        let retry = EvaluationJob {
            attempt: *attempt,
            ..reservation.job.clone()
        };
        // Left unacked on failure; `requeue_stale` recovers it.
        queue.enqueue(&retry).await?;
    }
    queue.ack(&reservation).await?;
    Ok(Some(outcome))
}

/// Runs forever. Queue errors are logged and retried after `poll`.
pub async fn run_worker(
    worker_id: usize,
    pipeline: Arc<Pipeline>,
    queue: Arc<dyn JobQueue>,
    poll: Duration,
) {
    info!("Evaluation worker {worker_id} started");
    loop {
        match work_once(&pipeline, queue.as_ref(), poll).await {
            Ok(Some(JobOutcome::Completed { result_id })) => {
                info!("Worker {worker_id} stored result {result_id}");
            }
            Ok(Some(_)) | Ok(None) => {}
            Err(e) => {
                warn!("Worker {worker_id} queue error, backing off: {e}");
                sleep(poll).await;
            }
        }
    }
}
