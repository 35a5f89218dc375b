//! Answer evaluation: dispatches each answer to the right scoring strategy.

use tokio::time::Instant;
use tracing::debug;

use crate::evaluation::fallback;
use crate::evaluation::judge::JudgmentProvider;
use crate::evaluation::scoring::{score_choice, score_code, score_text};
use crate::models::assessment::{Assessment, Question, QuestionKind};
use crate::models::result::QuestionEvaluation;
use crate::models::submission::{Answer, Submission};

/// Scores every answer of `submission`, in answer order.
///
/// Answers whose question id is not part of `assessment` are skipped.
/// Subjective answers go to `judge` one at a time; a failed or late
/// judgment becomes the fixed fallback judgment.
pub async fn evaluate_submission(
    judge: &dyn JudgmentProvider,
    submission: &Submission,
    assessment: &Assessment,
    deadline: Instant,
) -> Vec<QuestionEvaluation> {
    let questions = assessment.question_index();
    let mut evaluations = Vec::with_capacity(submission.answers.len());

    for answer in &submission.answers {
        let Some(question) = questions.get(answer.question_id.as_str()) else {
            debug!(
                "Submission {}: answer for unknown question {} skipped",
                submission.id, answer.question_id
            );
            continue;
        };
        let subject = format!("submission {} question {}", submission.id, question.question_id);
        evaluations.push(evaluate_answer(judge, question, answer, &subject, deadline).await);
    }

    evaluations
}

async fn evaluate_answer(
    judge: &dyn JudgmentProvider,
    question: &Question,
    answer: &Answer,
    subject: &str,
    deadline: Instant,
) -> QuestionEvaluation {
    match &question.kind {
        QuestionKind::Mcq {
            correct_option_id, ..
        } => score_choice(question, correct_option_id.as_deref(), answer),
        QuestionKind::Coding { .. } => {
            let (judgment, used_fallback) = fallback::resolve(
                "Code judgment",
                subject,
                deadline,
                judge.judge_code(question, answer),
                fallback::code_judgment,
            )
            .await;
            score_code(question, judgment, used_fallback)
        }
        QuestionKind::Descriptive | QuestionKind::Situational => {
            let (judgment, used_fallback) = fallback::resolve(
                "Text judgment",
                subject,
                deadline,
                judge.judge_text(question, answer),
                fallback::text_judgment,
            )
            .await;
            score_text(question, judgment, used_fallback)
        }
    }
}
