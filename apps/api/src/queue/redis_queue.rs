use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::queue::{EvaluationJob, JobQueue, Reservation};

/// Reliable list queue: producers `LPUSH` onto `name`, consumers move jobs
/// atomically into `name:processing` and `LREM` them once handled.
/// Jobs left in `name:processing` by a crashed worker go back with
/// `requeue_stale`.
#[derive(Clone)]
pub struct RedisJobQueue {
    client: redis::Client,
    name: String,
    processing: String,
}

impl RedisJobQueue {
    pub fn new(client: redis::Client, name: impl Into<String>) -> Self {
        let name = name.into();
        let processing = format!("{name}:processing");
        Self {
            client,
            name,
            processing,
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    /// Moves every in-flight job back onto the main queue. Call once at
    /// startup, before workers begin reserving.
    pub async fn requeue_stale(&self) -> Result<usize, AppError> {
        let mut conn = self.connection().await?;
        let mut moved = 0;
        loop {
            let job: Option<String> = redis::cmd("RPOPLPUSH")
                .arg(&self.processing)
                .arg(&self.name)
                .query_async(&mut conn)
                .await?;
            if job.is_none() {
                break;
            }
            moved += 1;
        }
        if moved > 0 {
            info!("Requeued {moved} in-flight evaluation jobs from {}", self.processing);
        }
        Ok(moved)
    }

    async fn discard(&self, conn: &mut MultiplexedConnection, raw: &str) -> Result<(), AppError> {
        let _: i64 = redis::cmd("LREM")
            .arg(&self.processing)
            .arg(1)
            .arg(raw)
            .query_async(conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &EvaluationJob) -> Result<(), AppError> {
        let payload = serde_json::to_string(job).map_err(anyhow::Error::from)?;
        let mut conn = self.connection().await?;
        let _: i64 = redis::cmd("LPUSH")
            .arg(&self.name)
            .arg(&payload)
            .query_async(&mut conn)
            .await?;
        debug!("Enqueued evaluation of submission {}", job.submission_id);
        Ok(())
    }

    async fn reserve(&self, wait: Duration) -> Result<Option<Reservation>, AppError> {
        let mut conn = self.connection().await?;
        // BRPOPLPUSH takes whole seconds; 0 would block forever.
        let seconds = wait.as_secs().max(1);
        let raw: Option<String> = redis::cmd("BRPOPLPUSH")
            .arg(&self.name)
            .arg(&self.processing)
            .arg(seconds)
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<EvaluationJob>(&raw) {
            Ok(job) => Ok(Some(Reservation { job, raw })),
            Err(e) => {
                error!("Dropping malformed evaluation job {raw:?}: {e}");
                self.discard(&mut conn, &raw).await?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, reservation: &Reservation) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        self.discard(&mut conn, &reservation.raw).await
    }
}
