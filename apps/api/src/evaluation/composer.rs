//! Result composition: evaluation + aggregation + insights -> one persisted
//! `ResultRecord`, then the application moves to `under_review`.
//!
//! Composition is idempotent per submission. A second run for the same
//! submission finds the existing result (or loses the insert race on the
//! unique `submission_id`) and reports `AlreadyEvaluated` instead of failing.

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::evaluator::evaluate_submission;
use crate::evaluation::fallback;
use crate::evaluation::judge::{InsightContext, InsightProvider, JudgmentProvider, QuestionFeedback};
use crate::evaluation::scoring::{percentage, round2};
use crate::evaluation::skills::aggregate_skills;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::assessment::Assessment;
use crate::models::result::{FeedbackReport, ResultRecord};
use crate::models::submission::Submission;
use crate::store::{HiringStore, InsertOutcome};

const DEFAULT_JOB_TITLE: &str = "Position";

/// Everything needed to compose a result, already loaded.
pub struct CompositionInput<'a> {
    pub submission: &'a Submission,
    pub assessment: &'a Assessment,
    pub application: &'a Application,
    pub job_title: Option<&'a str>,
    /// All applications for the same job, ranking context only.
    pub siblings: &'a [Application],
}

#[derive(Debug)]
pub enum Composition {
    Created(ResultRecord),
    AlreadyEvaluated { submission_id: Uuid },
}

/// Builds the result record without touching storage. Never fails: every
/// collaborator call that errors or misses `deadline` resolves to its fallback.
pub async fn build_result(
    judge: &dyn JudgmentProvider,
    insights: &dyn InsightProvider,
    input: &CompositionInput<'_>,
    deadline: Instant,
) -> ResultRecord {
    let CompositionInput {
        submission,
        assessment,
        application,
        job_title,
        siblings,
    } = input;

    // Step 1: score answers
    let evaluations = evaluate_submission(judge, submission, assessment, deadline).await;
    let total_score = round2(evaluations.iter().map(|e| e.points_earned).sum());
    let max_score = assessment.config.total_points;

    // Step 2: skills
    let questions = assessment.question_index();
    let skill_scores = aggregate_skills(&evaluations, &questions);

    // Step 3: overall percentage against the configured total
    let percentage = percentage(total_score, f64::from(max_score));

    // Step 4-5: reasoning + feedback, independent of each other
    let context = InsightContext {
        candidate_name: application.candidate_name.clone(),
        job_title: job_title.unwrap_or(DEFAULT_JOB_TITLE).to_string(),
        percentage,
        skill_scores: skill_scores.clone(),
        question_feedback: evaluations
            .iter()
            .filter_map(|e| {
                questions.get(e.question_id.as_str()).map(|q| QuestionFeedback {
                    question: q.question_text.clone(),
                    feedback: e.ai_feedback.clone(),
                })
            })
            .collect(),
    };
    let subject = format!("submission {}", submission.id);

    let ((ai_reasoning, _), (narrative, _)) = tokio::join!(
        fallback::resolve(
            "Reasoning generation",
            &subject,
            deadline,
            insights.reasoning(&context, siblings),
            fallback::reasoning,
        ),
        fallback::resolve(
            "Feedback generation",
            &subject,
            deadline,
            insights.feedback(&context, siblings),
            fallback::feedback,
        ),
    );

    let now = Utc::now();
    ResultRecord {
        id: Uuid::new_v4(),
        submission_id: submission.id,
        application_id: submission.application_id,
        candidate_id: submission.candidate_id,
        assessment_id: submission.assessment_id,
        total_score,
        max_score: i64::from(max_score),
        percentage,
        question_evaluations: evaluations,
        ai_reasoning,
        feedback_report: FeedbackReport {
            overall_score: percentage,
            percentile: None,
            skill_scores,
            narrative,
        },
        rank: None,
        total_candidates: None,
        is_shortlisted: false,
        evaluated_at: now,
        created_at: now,
    }
}

/// Loads a submission and its context, composes and persists its result,
/// and moves the application to `under_review`.
pub async fn compose_for_submission(
    store: &dyn HiringStore,
    judge: &dyn JudgmentProvider,
    insights: &dyn InsightProvider,
    submission_id: Uuid,
    timeout: Duration,
) -> Result<Composition, AppError> {
    if let Some(existing) = store.result_for_submission(submission_id).await? {
        debug!("Submission {submission_id} already has result {}", existing.id);
        ensure_under_review(store, existing.application_id).await?;
        return Ok(Composition::AlreadyEvaluated { submission_id });
    }

    let submission = store
        .submission(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;

    if submission.is_practice {
        return Err(AppError::Validation(format!(
            "Submission {submission_id} is a practice run and is not evaluated"
        )));
    }

    let assessment = store
        .assessment(submission.assessment_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Assessment {} not found", submission.assessment_id))
        })?;

    let application = store
        .application(submission.application_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Application {} not found", submission.application_id))
        })?;

    let job_title = store.job_title(application.job_id).await?;
    let siblings = store.applications_for_job(application.job_id).await?;

    let deadline = Instant::now() + timeout;
    let record = build_result(
        judge,
        insights,
        &CompositionInput {
            submission: &submission,
            assessment: &assessment,
            application: &application,
            job_title: job_title.as_deref(),
            siblings: &siblings,
        },
        deadline,
    )
    .await;

    let composition = match store.insert_result(&record).await? {
        InsertOutcome::Inserted => {
            info!(
                "Result {} stored for submission {}: {}/{} ({}%)",
                record.id, submission_id, record.total_score, record.max_score, record.percentage
            );
            Composition::Created(record)
        }
        InsertOutcome::AlreadyExists => {
            debug!("Result for submission {submission_id} was stored concurrently");
            Composition::AlreadyEvaluated { submission_id }
        }
    };

    ensure_under_review(store, application.id).await?;
    Ok(composition)
}

async fn ensure_under_review(store: &dyn HiringStore, application_id: Uuid) -> Result<(), AppError> {
    let moved = store
        .transition_application(
            application_id,
            ApplicationStatus::AssessmentCompleted,
            ApplicationStatus::UnderReview,
            Utc::now(),
        )
        .await?;
    if !moved {
        debug!("Application {application_id} not in assessment_completed; status left as is");
    }
    Ok(())
}
