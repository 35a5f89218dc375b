//! Evaluation job queue. Delivery is at-least-once: a reserved job stays in
//! flight until acked, and composition tolerates duplicates.

pub mod redis_queue;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub use redis_queue::RedisJobQueue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationJob {
    pub submission_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempt: u32,
}

impl EvaluationJob {
    pub fn new(submission_id: Uuid) -> Self {
        Self {
            submission_id,
            enqueued_at: Utc::now(),
            attempt: 0,
        }
    }
}

/// A job taken off the queue. `raw` is the payload exactly as stored, used
/// to remove it from the in-flight list on ack.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub job: EvaluationJob,
    pub raw: String,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &EvaluationJob) -> Result<(), AppError>;

    /// Waits up to `wait` for a job. `None` on timeout.
    async fn reserve(&self, wait: Duration) -> Result<Option<Reservation>, AppError>;

    async fn ack(&self, reservation: &Reservation) -> Result<(), AppError>;
}
