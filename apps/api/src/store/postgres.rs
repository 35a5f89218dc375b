use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::assessment::Assessment;
use crate::models::result::ResultRecord;
use crate::models::submission::Submission;
use crate::store::{HiringStore, InsertOutcome};

/// `HiringStore` backed by PostgreSQL. Uniqueness (one result per submission,
/// one counted submission per application) is enforced by the schema.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn outcome(rows_affected: u64) -> InsertOutcome {
    if rows_affected == 0 {
        InsertOutcome::AlreadyExists
    } else {
        InsertOutcome::Inserted
    }
}

#[async_trait]
impl HiringStore for PgStore {
    async fn application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let row = sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as("SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at")
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // Conditional on the current status so concurrent writers cannot skip a state.
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $1,
                updated_at = $2,
                assessment_started_at = CASE WHEN $1 = 'assessment_pending'
                    THEN $2 ELSE assessment_started_at END,
                assessment_completed_at = CASE WHEN $1 = 'assessment_completed'
                    THEN $2 ELSE assessment_completed_at END
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(to.as_str())
        .bind(at)
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn restore_application(&self, snapshot: &Application) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $1,
                assessment_started_at = $2,
                assessment_completed_at = $3,
                updated_at = $4
            WHERE id = $5 AND status = 'assessment_completed'
            "#,
        )
        .bind(snapshot.status.as_str())
        .bind(snapshot.assessment_started_at)
        .bind(snapshot.assessment_completed_at)
        .bind(snapshot.updated_at)
        .bind(snapshot.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn job_title(&self, job_id: Uuid) -> Result<Option<String>, AppError> {
        let title = sqlx::query_scalar("SELECT title FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(title)
    }

    async fn assessment(&self, id: Uuid) -> Result<Option<Assessment>, AppError> {
        let row = sqlx::query_as("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn submission(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let row = sqlx::query_as("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn has_final_submission(&self, application_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE application_id = $1 AND NOT is_practice)",
        )
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO submissions
                (id, application_id, assessment_id, candidate_id, answers,
                 started_at, submitted_at, total_time_seconds, is_practice)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(submission.id)
        .bind(submission.application_id)
        .bind(submission.assessment_id)
        .bind(submission.candidate_id)
        .bind(Json(&submission.answers))
        .bind(submission.started_at)
        .bind(submission.submitted_at)
        .bind(submission.total_time_seconds)
        .bind(submission.is_practice)
        .execute(&self.pool)
        .await?;
        Ok(outcome(result.rows_affected()))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn result_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError> {
        let row = sqlx::query_as("SELECT * FROM results WHERE submission_id = $1")
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn result_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError> {
        let row = sqlx::query_as(
            "SELECT * FROM results WHERE application_id = $1 ORDER BY evaluated_at DESC LIMIT 1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_result(&self, result: &ResultRecord) -> Result<InsertOutcome, AppError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO results
                (id, submission_id, application_id, candidate_id, assessment_id,
                 total_score, max_score, percentage, question_evaluations,
                 ai_reasoning, feedback_report, rank, total_candidates,
                 is_shortlisted, evaluated_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (submission_id) DO NOTHING
            "#,
        )
        .bind(result.id)
        .bind(result.submission_id)
        .bind(result.application_id)
        .bind(result.candidate_id)
        .bind(result.assessment_id)
        .bind(result.total_score)
        .bind(result.max_score)
        .bind(result.percentage)
        .bind(Json(&result.question_evaluations))
        .bind(Json(&result.ai_reasoning))
        .bind(Json(&result.feedback_report))
        .bind(result.rank)
        .bind(result.total_candidates)
        .bind(result.is_shortlisted)
        .bind(result.evaluated_at)
        .bind(result.created_at)
        .execute(&self.pool)
        .await?;
        Ok(outcome(inserted.rows_affected()))
    }

    async fn results_for_job(&self, job_id: Uuid) -> Result<Vec<ResultRecord>, AppError> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.*
            FROM results r
            JOIN applications a ON a.id = r.application_id
            WHERE a.job_id = $1
            ORDER BY r.percentage DESC, r.evaluated_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn record_rank(
        &self,
        result_id: Uuid,
        rank: i64,
        total_candidates: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE results SET rank = $1, total_candidates = $2 WHERE id = $3")
            .bind(rank)
            .bind(total_candidates)
            .bind(result_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_shortlisted(
        &self,
        application_id: Uuid,
        shortlisted: bool,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE results SET is_shortlisted = $1 WHERE application_id = $2")
            .bind(shortlisted)
            .bind(application_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
