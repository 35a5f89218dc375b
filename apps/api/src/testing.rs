//! Fixtures and in-memory collaborators shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::fallback;
use crate::evaluation::judge::{
    CodeJudgment, InsightContext, InsightProvider, JudgmentProvider, TextJudgment,
};
use crate::llm_client::LlmError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::assessment::{
    Assessment, AssessmentConfig, Difficulty, McqOption, Question, QuestionKind, TestCase,
};
use crate::models::result::{
    AiReasoning, BiasCheck, FeedbackNarrative, FeedbackReport, QuestionEvaluation, RankingFactor,
    ResultRecord,
};
use crate::models::submission::{Answer, AnswerPayload, Submission};
use crate::queue::{EvaluationJob, JobQueue, Reservation};
use crate::store::{HiringStore, InsertOutcome};

// ── Questions and answers ───────────────────────────────────────────────────

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

pub fn mcq_question(id: &str, points: u32, correct: &str, skill_tags: &[&str]) -> Question {
    Question {
        question_id: id.to_string(),
        question_text: format!("Which option is right for {id}?"),
        difficulty: Difficulty::Easy,
        points,
        skill_tags: tags(skill_tags),
        kind: QuestionKind::Mcq {
            options: ["a", "b", "c", "d"]
                .iter()
                .map(|o| McqOption {
                    option_id: o.to_string(),
                    text: format!("Option {o}"),
                })
                .collect(),
            correct_option_id: Some(correct.to_string()),
        },
    }
}

pub fn coding_question(id: &str, points: u32, skill_tags: &[&str]) -> Question {
    Question {
        question_id: id.to_string(),
        question_text: format!("Implement string reversal ({id})"),
        difficulty: Difficulty::Medium,
        points,
        skill_tags: tags(skill_tags),
        kind: QuestionKind::Coding {
            language: Some("python".to_string()),
            test_cases: vec![
                TestCase {
                    input: "abc".to_string(),
                    expected_output: "cba".to_string(),
                    is_hidden: false,
                },
                TestCase {
                    input: "".to_string(),
                    expected_output: "".to_string(),
                    is_hidden: true,
                },
            ],
            starter_code: None,
        },
    }
}

pub fn text_question(id: &str, points: u32, skill_tags: &[&str]) -> Question {
    Question {
        question_id: id.to_string(),
        question_text: format!("Describe how you handle disagreement ({id})"),
        difficulty: Difficulty::Medium,
        points,
        skill_tags: tags(skill_tags),
        kind: QuestionKind::Descriptive,
    }
}

fn answer(question_id: &str, payload: AnswerPayload) -> Answer {
    Answer {
        question_id: question_id.to_string(),
        payload,
        time_spent_seconds: 30,
    }
}

pub fn choice_answer(question_id: &str, option: &str) -> Answer {
    answer(
        question_id,
        AnswerPayload::Choice {
            selected_option_id: option.to_string(),
        },
    )
}

pub fn code_answer(question_id: &str, code: &str) -> Answer {
    answer(
        question_id,
        AnswerPayload::Code {
            code: code.to_string(),
            language: Some("python".to_string()),
        },
    )
}

pub fn text_answer(question_id: &str, text: &str) -> Answer {
    answer(
        question_id,
        AnswerPayload::Text {
            text_answer: text.to_string(),
        },
    )
}

// ── Records ─────────────────────────────────────────────────────────────────

pub fn assessment_with(total_points: u32, questions: Vec<Question>) -> Assessment {
    Assessment {
        id: Uuid::new_v4(),
        job_id: Uuid::new_v4(),
        title: "Backend screening".to_string(),
        description: String::new(),
        questions,
        config: AssessmentConfig {
            total_points,
            ..AssessmentConfig::default()
        },
        created_at: Utc::now(),
    }
}

pub fn submission_for(assessment: &Assessment, answers: Vec<Answer>) -> Submission {
    let now = Utc::now();
    Submission {
        id: Uuid::new_v4(),
        application_id: Uuid::new_v4(),
        assessment_id: assessment.id,
        candidate_id: Uuid::new_v4(),
        answers,
        started_at: now,
        submitted_at: now,
        total_time_seconds: 0,
        is_practice: false,
    }
}

fn application(job_id: Uuid, status: ApplicationStatus, name: &str) -> Application {
    let now = Utc::now();
    Application {
        id: Uuid::new_v4(),
        job_id,
        candidate_id: Uuid::new_v4(),
        candidate_name: name.to_string(),
        candidate_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        status,
        assessment_started_at: None,
        assessment_completed_at: None,
        applied_at: now,
        updated_at: now,
    }
}

pub fn application_in(status: ApplicationStatus) -> Application {
    application(Uuid::new_v4(), status, "Some Candidate")
}

pub fn evaluation_for(question: &Question, earned: f64) -> QuestionEvaluation {
    QuestionEvaluation {
        question_id: question.question_id.clone(),
        question_type: question.kind.label().to_string(),
        points_earned: earned,
        max_points: question.points,
        is_correct: earned > 0.0,
        correctness_score: None,
        efficiency_score: None,
        readability_score: None,
        ai_feedback: String::new(),
        strengths: vec![],
        improvements: vec![],
        used_fallback: false,
    }
}

/// A stored-looking result for `app` at the given percentage.
pub fn result_for(app: &Application, assessment: &Assessment, percentage: f64) -> ResultRecord {
    let max_score = assessment.config.total_points;
    let now = Utc::now();
    ResultRecord {
        id: Uuid::new_v4(),
        submission_id: Uuid::new_v4(),
        application_id: app.id,
        candidate_id: app.candidate_id,
        assessment_id: assessment.id,
        total_score: percentage * f64::from(max_score) / 100.0,
        max_score: i64::from(max_score),
        percentage,
        question_evaluations: vec![],
        ai_reasoning: fallback::reasoning(),
        feedback_report: FeedbackReport {
            overall_score: percentage,
            percentile: None,
            skill_scores: vec![],
            narrative: fallback::feedback(),
        },
        rank: None,
        total_candidates: None,
        is_shortlisted: false,
        evaluated_at: now,
        created_at: now,
    }
}

// ── Seeded stores ───────────────────────────────────────────────────────────

fn store_for(assessment: &Assessment) -> InMemoryStore {
    let store = InMemoryStore::default();
    store.put_job(assessment.job_id, "Backend Engineer Intern");
    store.put_assessment(assessment.clone());
    store
}

/// One job, one completed application and its final submission.
pub fn seeded_store(assessment: &Assessment, answers: Vec<Answer>) -> (InMemoryStore, Submission) {
    let store = store_for(assessment);
    let app = application(
        assessment.job_id,
        ApplicationStatus::AssessmentCompleted,
        "Test Candidate",
    );
    let submission = Submission {
        application_id: app.id,
        candidate_id: app.candidate_id,
        ..submission_for(assessment, answers)
    };
    store.put_application(app);
    store.put_submission(submission.clone());
    (store, submission)
}

pub fn seeded_store_with_status(
    assessment: &Assessment,
    status: ApplicationStatus,
) -> (InMemoryStore, Application) {
    let store = store_for(assessment);
    let app = application(assessment.job_id, status, "Test Candidate");
    store.put_application(app.clone());
    (store, app)
}

/// `count` under-review applications for the assessment's job.
pub fn seeded_job(assessment: &Assessment, count: usize) -> (InMemoryStore, Vec<Application>) {
    let store = store_for(assessment);
    let apps: Vec<Application> = (0..count)
        .map(|i| {
            application(
                assessment.job_id,
                ApplicationStatus::UnderReview,
                &format!("Candidate {i}"),
            )
        })
        .collect();
    for app in &apps {
        store.put_application(app.clone());
    }
    (store, apps)
}

// ── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<Uuid, String>,
    applications: HashMap<Uuid, Application>,
    assessments: HashMap<Uuid, Assessment>,
    submissions: Vec<Submission>,
    results: Vec<ResultRecord>,
    hide_next_result_lookup: bool,
    fail_next_assessment_lookup: bool,
}

/// `HiringStore` over plain collections, with the same uniqueness rules as
/// the database schema.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    fn with<R>(&self, f: impl FnOnce(&mut StoreInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    pub fn put_job(&self, id: Uuid, title: &str) {
        self.with(|s| s.jobs.insert(id, title.to_string()));
    }

    pub fn put_application(&self, app: Application) {
        self.with(|s| s.applications.insert(app.id, app));
    }

    pub fn put_assessment(&self, assessment: Assessment) {
        self.with(|s| s.assessments.insert(assessment.id, assessment));
    }

    pub fn put_submission(&self, submission: Submission) {
        self.with(|s| s.submissions.push(submission));
    }

    pub fn put_result(&self, result: ResultRecord) {
        self.with(|s| s.results.push(result));
    }

    pub fn force_status(&self, application_id: Uuid, status: ApplicationStatus) {
        self.with(|s| {
            if let Some(app) = s.applications.get_mut(&application_id) {
                app.status = status;
            }
        });
    }

    /// Makes the next `result_for_submission` miss, as if a concurrent
    /// worker inserted right after the lookup.
    pub fn hide_results_from_next_lookup(&self) {
        self.with(|s| s.hide_next_result_lookup = true);
    }

    /// The next `assessment` lookup fails the way an exhausted pool does.
    pub fn fail_next_assessment_lookup(&self) {
        self.with(|s| s.fail_next_assessment_lookup = true);
    }

    pub fn application_snapshot(&self, id: Uuid) -> Application {
        self.with(|s| s.applications.get(&id).cloned())
            .expect("application was seeded")
    }

    pub fn result_count(&self) -> usize {
        self.with(|s| s.results.len())
    }

    pub fn submission_count(&self) -> usize {
        self.with(|s| s.submissions.len())
    }
}

#[async_trait]
impl HiringStore for InMemoryStore {
    async fn application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self.with(|s| s.applications.get(&id).cloned()))
    }

    async fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let mut apps: Vec<Application> = self.with(|s| {
            s.applications
                .values()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect()
        });
        apps.sort_by_key(|a| a.applied_at);
        Ok(apps)
    }

    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        Ok(self.with(|s| match s.applications.get_mut(&id) {
            Some(app) if app.status == from => {
                app.status = to;
                app.updated_at = at;
                match to {
                    ApplicationStatus::AssessmentPending => app.assessment_started_at = Some(at),
                    ApplicationStatus::AssessmentCompleted => {
                        app.assessment_completed_at = Some(at)
                    }
                    _ => {}
                }
                true
            }
            _ => false,
        }))
    }

    async fn restore_application(&self, snapshot: &Application) -> Result<bool, AppError> {
        Ok(self.with(|s| match s.applications.get_mut(&snapshot.id) {
            Some(app) if app.status == ApplicationStatus::AssessmentCompleted => {
                *app = snapshot.clone();
                true
            }
            _ => false,
        }))
    }

    async fn job_title(&self, job_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.with(|s| s.jobs.get(&job_id).cloned()))
    }

    async fn assessment(&self, id: Uuid) -> Result<Option<Assessment>, AppError> {
        self.with(|s| {
            if std::mem::take(&mut s.fail_next_assessment_lookup) {
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(s.assessments.get(&id).cloned())
        })
    }

    async fn submission(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        Ok(self.with(|s| s.submissions.iter().find(|x| x.id == id).cloned()))
    }

    async fn has_final_submission(&self, application_id: Uuid) -> Result<bool, AppError> {
        Ok(self.with(|s| {
            s.submissions
                .iter()
                .any(|x| x.application_id == application_id && !x.is_practice)
        }))
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<InsertOutcome, AppError> {
        Ok(self.with(|s| {
            let duplicate = s.submissions.iter().any(|x| {
                x.id == submission.id
                    || (!submission.is_practice
                        && !x.is_practice
                        && x.application_id == submission.application_id)
            });
            if duplicate {
                InsertOutcome::AlreadyExists
            } else {
                s.submissions.push(submission.clone());
                InsertOutcome::Inserted
            }
        }))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<(), AppError> {
        self.with(|s| s.submissions.retain(|x| x.id != id));
        Ok(())
    }

    async fn result_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError> {
        Ok(self.with(|s| {
            if std::mem::take(&mut s.hide_next_result_lookup) {
                return None;
            }
            s.results
                .iter()
                .find(|r| r.submission_id == submission_id)
                .cloned()
        }))
    }

    async fn result_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ResultRecord>, AppError> {
        Ok(self.with(|s| {
            s.results
                .iter()
                .find(|r| r.application_id == application_id)
                .cloned()
        }))
    }

    async fn insert_result(&self, result: &ResultRecord) -> Result<InsertOutcome, AppError> {
        Ok(self.with(|s| {
            if s.results.iter().any(|r| r.submission_id == result.submission_id) {
                InsertOutcome::AlreadyExists
            } else {
                s.results.push(result.clone());
                InsertOutcome::Inserted
            }
        }))
    }

    async fn results_for_job(&self, job_id: Uuid) -> Result<Vec<ResultRecord>, AppError> {
        let mut results: Vec<ResultRecord> = self.with(|s| {
            s.results
                .iter()
                .filter(|r| {
                    s.applications
                        .get(&r.application_id)
                        .is_some_and(|a| a.job_id == job_id)
                })
                .cloned()
                .collect()
        });
        results.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        Ok(results)
    }

    async fn record_rank(
        &self,
        result_id: Uuid,
        rank: i64,
        total_candidates: i64,
    ) -> Result<(), AppError> {
        self.with(|s| {
            if let Some(r) = s.results.iter_mut().find(|r| r.id == result_id) {
                r.rank = Some(rank);
                r.total_candidates = Some(total_candidates);
            }
        });
        Ok(())
    }

    async fn set_shortlisted(
        &self,
        application_id: Uuid,
        shortlisted: bool,
    ) -> Result<(), AppError> {
        self.with(|s| {
            for r in s.results.iter_mut().filter(|r| r.application_id == application_id) {
                r.is_shortlisted = shortlisted;
            }
        });
        Ok(())
    }
}

// ── In-memory queue ─────────────────────────────────────────────────────────

/// FIFO queue with an in-flight list, mirroring the Redis reliable queue.
#[derive(Default)]
pub struct InMemoryQueue {
    pending: Mutex<VecDeque<String>>,
    in_flight: Mutex<Vec<String>>,
}

impl InMemoryQueue {
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }

    pub fn pending_submissions(&self) -> Vec<Uuid> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|raw| serde_json::from_str::<EvaluationJob>(raw).unwrap().submission_id)
            .collect()
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, job: &EvaluationJob) -> Result<(), AppError> {
        let raw = serde_json::to_string(job).map_err(anyhow::Error::from)?;
        self.pending.lock().unwrap().push_back(raw);
        Ok(())
    }

    async fn reserve(&self, wait: Duration) -> Result<Option<Reservation>, AppError> {
        let next = self.pending.lock().unwrap().pop_front();
        let Some(raw) = next else {
            tokio::time::sleep(wait).await;
            return Ok(None);
        };
        self.in_flight.lock().unwrap().push(raw.clone());
        let job = serde_json::from_str(&raw).map_err(anyhow::Error::from)?;
        Ok(Some(Reservation { job, raw }))
    }

    async fn ack(&self, reservation: &Reservation) -> Result<(), AppError> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if let Some(pos) = in_flight.iter().position(|r| *r == reservation.raw) {
            in_flight.remove(pos);
        }
        Ok(())
    }
}

/// Queue whose broker is down: every enqueue fails.
pub struct UnavailableQueue;

#[async_trait]
impl JobQueue for UnavailableQueue {
    async fn enqueue(&self, _job: &EvaluationJob) -> Result<(), AppError> {
        Err(AppError::Queue(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "redis down",
        ))))
    }

    async fn reserve(&self, _wait: Duration) -> Result<Option<Reservation>, AppError> {
        Ok(None)
    }

    async fn ack(&self, _reservation: &Reservation) -> Result<(), AppError> {
        Ok(())
    }
}

// ── Scripted collaborators ──────────────────────────────────────────────────

fn scripted_failure() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "scripted failure".to_string(),
    }
}

/// Judgment provider returning fixed judgments, or failing every call.
#[derive(Default)]
pub struct ScriptedJudge {
    code: Option<CodeJudgment>,
    text: Option<TextJudgment>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn failing() -> Self {
        Self::default()
    }

    /// Every code sub-score is `code`, every text sub-score is `text`.
    pub fn scoring(code: f64, text: f64) -> Self {
        Self {
            code: Some(CodeJudgment {
                correctness_score: code,
                efficiency_score: code,
                readability_score: code,
                edge_case_score: code,
                ..fallback::code_judgment()
            }),
            text: Some(TextJudgment {
                relevance_score: text,
                communication_score: text,
                critical_thinking_score: text,
                professionalism_score: text,
                ..fallback::text_judgment()
            }),
            ..Self::default()
        }
    }

    /// Code answers get these sub-scores; text answers fail.
    pub fn code_scores(correctness: f64, efficiency: f64, readability: f64, edge: f64) -> Self {
        Self {
            code: Some(CodeJudgment {
                correctness_score: correctness,
                efficiency_score: efficiency,
                readability_score: readability,
                edge_case_score: edge,
                is_correct: true,
                strengths: vec!["Readable".to_string()],
                improvements: vec![],
                detailed_feedback: "Works for the visible cases.".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T: Clone>(&self, scripted: &Option<T>) -> Result<T, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.clone().ok_or_else(scripted_failure)
    }
}

#[async_trait]
impl JudgmentProvider for ScriptedJudge {
    async fn judge_code(&self, _: &Question, _: &Answer) -> Result<CodeJudgment, LlmError> {
        self.respond(&self.code).await
    }

    async fn judge_text(&self, _: &Question, _: &Answer) -> Result<TextJudgment, LlmError> {
        self.respond(&self.text).await
    }
}

/// Insight provider that records what it was shown.
pub struct ScriptedInsights {
    fail: bool,
    calls: AtomicUsize,
    last: Mutex<Option<(InsightContext, usize)>>,
}

impl ScriptedInsights {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn working() -> Self {
        Self::new(false)
    }

    pub fn failing() -> Self {
        Self::new(true)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<InsightContext> {
        self.last.lock().unwrap().as_ref().map(|(c, _)| c.clone())
    }

    pub fn last_sibling_count(&self) -> Option<usize> {
        self.last.lock().unwrap().as_ref().map(|(_, n)| *n)
    }

    fn record(&self, context: &InsightContext, siblings: &[Application]) -> Result<(), LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((context.clone(), siblings.len()));
        if self.fail {
            Err(scripted_failure())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InsightProvider for ScriptedInsights {
    async fn reasoning(
        &self,
        context: &InsightContext,
        siblings: &[Application],
    ) -> Result<AiReasoning, LlmError> {
        self.record(context, siblings)?;
        Ok(AiReasoning {
            overall_assessment: format!("{} scored {}%", context.candidate_name, context.percentage),
            ranking_factors: vec![RankingFactor {
                factor: "Technical depth".to_string(),
                impact: "high".to_string(),
                score: context.percentage,
                explanation: "Derived from answers".to_string(),
            }],
            confidence_score: 0.9,
            bias_check: BiasCheck {
                detected: false,
                notes: "None".to_string(),
            },
            prediction: "Likely to ramp up quickly".to_string(),
        })
    }

    async fn feedback(
        &self,
        context: &InsightContext,
        siblings: &[Application],
    ) -> Result<FeedbackNarrative, LlmError> {
        self.record(context, siblings)?;
        Ok(FeedbackNarrative {
            top_strengths: vec!["Fundamentals".to_string()],
            improvement_areas: vec!["Edge cases".to_string()],
            learning_resources: vec![],
            improvement_plan: "Practice daily".to_string(),
            estimated_improvement_time: "2 weeks".to_string(),
            positive_message: "Well done".to_string(),
            next_steps: vec!["Review feedback".to_string()],
        })
    }
}
