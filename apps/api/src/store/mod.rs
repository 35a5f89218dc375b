//! Persistence seam for applications, assessments, submissions and results.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::assessment::Assessment;
use crate::models::result::ResultRecord;
use crate::models::submission::Submission;

pub use postgres::PgStore;

/// Outcome of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[async_trait]
pub trait HiringStore: Send + Sync {
    // Applications
    async fn application(&self, id: Uuid) -> Result<Option<Application>, AppError>;
    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError>;
    /// Moves `id` from `from` to `to` only if it is currently in `from`.
    /// Entering `assessment_pending` stamps `assessment_started_at`; entering
    /// `assessment_completed` stamps `assessment_completed_at`.
    /// Returns false when the application was not in `from`.
    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    /// Rolls an `assessment_completed` application back to `snapshot`
    /// (status and timestamps). Not a lifecycle transition: only used to undo
    /// an intake that could not be scheduled. False if the status moved on.
    async fn restore_application(&self, snapshot: &Application) -> Result<bool, AppError>;

    // Jobs and assessments
    async fn job_title(&self, job_id: Uuid) -> Result<Option<String>, AppError>;
    async fn assessment(&self, id: Uuid) -> Result<Option<Assessment>, AppError>;

    // Submissions
    async fn submission(&self, id: Uuid) -> Result<Option<Submission>, AppError>;
    /// True when a non-practice submission exists for the application.
    async fn has_final_submission(&self, application_id: Uuid) -> Result<bool, AppError>;
    async fn insert_submission(&self, submission: &Submission) -> Result<InsertOutcome, AppError>;
    async fn delete_submission(&self, id: Uuid) -> Result<(), AppError>;

    // Results
    async fn result_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError>;
    async fn result_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError>;
    async fn insert_result(&self, result: &ResultRecord) -> Result<InsertOutcome, AppError>;
    /// Results for every application of the job, best percentage first.
    async fn results_for_job(&self, job_id: Uuid) -> Result<Vec<ResultRecord>, AppError>;
    async fn record_rank(
        &self,
        result_id: Uuid,
        rank: i64,
        total_candidates: i64,
    ) -> Result<(), AppError>;
    async fn set_shortlisted(&self, application_id: Uuid, shortlisted: bool)
        -> Result<(), AppError>;
}
