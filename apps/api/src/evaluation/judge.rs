//! External judgment collaborators and their LLM-backed implementation.
//!
//! `JudgmentProvider` scores subjective answers; `InsightProvider` writes the
//! recruiter reasoning and the candidate feedback narrative. Both may fail
//! with any `LlmError`; callers always substitute a fixed fallback
//! (see `fallback.rs`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::evaluation::prompts::{
    CODE_REVIEW_PROMPT_TEMPLATE, CODE_REVIEW_SYSTEM, FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM,
    REASONING_PROMPT_TEMPLATE, REASONING_SYSTEM, TEXT_REVIEW_PROMPT_TEMPLATE, TEXT_REVIEW_SYSTEM,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCORE_RANGE_INSTRUCTION};
use crate::llm_client::{check_range, LlmClient, LlmError, Validate};
use crate::models::application::Application;
use crate::models::assessment::{Question, QuestionKind};
use crate::models::result::{AiReasoning, FeedbackNarrative, SkillScore};
use crate::models::submission::{Answer, AnswerPayload};

// ────────────────────────────────────────────────────────────────────────────
// Judgment schemas
// ────────────────────────────────────────────────────────────────────────────

/// Structured review of a code submission. All sub-scores in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeJudgment {
    pub correctness_score: f64,
    pub efficiency_score: f64,
    pub readability_score: f64,
    pub edge_case_score: f64,
    pub is_correct: bool,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub detailed_feedback: String,
}

/// Structured review of a free-text answer. All sub-scores in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextJudgment {
    pub relevance_score: f64,
    pub communication_score: f64,
    pub critical_thinking_score: f64,
    pub professionalism_score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub detailed_feedback: String,
}

impl Validate for CodeJudgment {
    fn validate(&self) -> Result<(), String> {
        check_range("correctness_score", self.correctness_score, 0.0, 100.0)?;
        check_range("efficiency_score", self.efficiency_score, 0.0, 100.0)?;
        check_range("readability_score", self.readability_score, 0.0, 100.0)?;
        check_range("edge_case_score", self.edge_case_score, 0.0, 100.0)
    }
}

impl Validate for TextJudgment {
    fn validate(&self) -> Result<(), String> {
        check_range("relevance_score", self.relevance_score, 0.0, 100.0)?;
        check_range("communication_score", self.communication_score, 0.0, 100.0)?;
        check_range(
            "critical_thinking_score",
            self.critical_thinking_score,
            0.0,
            100.0,
        )?;
        check_range("professionalism_score", self.professionalism_score, 0.0, 100.0)
    }
}

impl Validate for AiReasoning {
    fn validate(&self) -> Result<(), String> {
        check_range("confidence_score", self.confidence_score, 0.0, 1.0)?;
        for factor in &self.ranking_factors {
            let field = format!("ranking_factors[{}].score", factor.factor);
            check_range(&field, factor.score, 0.0, 100.0)?;
        }
        if self.overall_assessment.trim().is_empty() {
            return Err("overall_assessment is empty".to_string());
        }
        Ok(())
    }
}

impl Validate for FeedbackNarrative {
    fn validate(&self) -> Result<(), String> {
        if self.positive_message.trim().is_empty() {
            return Err("positive_message is empty".to_string());
        }
        if self.improvement_plan.trim().is_empty() {
            return Err("improvement_plan is empty".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Insight context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct QuestionFeedback {
    pub question: String,
    pub feedback: String,
}

/// Everything the reasoning and feedback collaborators see about a candidate.
#[derive(Debug, Clone, Serialize)]
pub struct InsightContext {
    pub candidate_name: String,
    pub job_title: String,
    pub percentage: f64,
    pub skill_scores: Vec<SkillScore>,
    pub question_feedback: Vec<QuestionFeedback>,
}

// ────────────────────────────────────────────────────────────────────────────
// Traits
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait JudgmentProvider: Send + Sync {
    async fn judge_code(&self, question: &Question, answer: &Answer)
        -> Result<CodeJudgment, LlmError>;

    async fn judge_text(&self, question: &Question, answer: &Answer)
        -> Result<TextJudgment, LlmError>;
}

/// Sibling applications are ranking context only; providers never rank.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn reasoning(
        &self,
        context: &InsightContext,
        siblings: &[Application],
    ) -> Result<AiReasoning, LlmError>;

    async fn feedback(
        &self,
        context: &InsightContext,
        siblings: &[Application],
    ) -> Result<FeedbackNarrative, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed implementation
// ────────────────────────────────────────────────────────────────────────────

/// Judges answers and writes insights through the shared `LlmClient`.
pub struct LlmAssessor {
    llm: LlmClient,
}

impl LlmAssessor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

fn to_json<T: Serialize>(value: &T) -> Result<String, LlmError> {
    serde_json::to_string(value).map_err(LlmError::Parse)
}

/// Fills `{name}` placeholders in a single pass. Substituted values are never
/// re-scanned, so text inside them that looks like a placeholder stays literal.
/// Braces that do not name a known placeholder are copied through.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let matched = vars.iter().find_map(|(name, value)| {
            after_brace
                .strip_prefix(name)?
                .strip_prefix('}')
                .map(|tail| (*value, tail))
        });
        match matched {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_code_prompt(question: &Question, answer: &Answer) -> Result<String, LlmError> {
    let (language, test_cases) = match &question.kind {
        QuestionKind::Coding {
            language,
            test_cases,
            ..
        } => (language.as_deref(), test_cases.as_slice()),
        _ => (None, &[][..]),
    };
    let submitted_language = match &answer.payload {
        AnswerPayload::Code { language, .. } => language.as_deref(),
        _ => None,
    };

    Ok(fill_template(
        CODE_REVIEW_PROMPT_TEMPLATE,
        &[
            ("score_range_instruction", SCORE_RANGE_INSTRUCTION),
            ("language", submitted_language.or(language).unwrap_or("unspecified")),
            ("test_cases_json", to_json(&test_cases)?.as_str()),
            ("question_text", question.question_text.as_str()),
            ("code", answer.payload.code().unwrap_or_default()),
        ],
    ))
}

pub fn build_text_prompt(question: &Question, answer: &Answer) -> String {
    fill_template(
        TEXT_REVIEW_PROMPT_TEMPLATE,
        &[
            ("score_range_instruction", SCORE_RANGE_INSTRUCTION),
            ("skills", question.skill_tags.join(", ").as_str()),
            ("question_text", question.question_text.as_str()),
            ("answer", answer.payload.text().unwrap_or_default()),
        ],
    )
}

pub fn build_reasoning_prompt(
    context: &InsightContext,
    siblings: &[Application],
) -> Result<String, LlmError> {
    Ok(fill_template(
        REASONING_PROMPT_TEMPLATE,
        &[
            ("percentage", context.percentage.to_string().as_str()),
            ("skill_scores_json", to_json(&context.skill_scores)?.as_str()),
            ("total_candidates", siblings.len().to_string().as_str()),
            ("job_title", context.job_title.as_str()),
            ("candidate_name", context.candidate_name.as_str()),
        ],
    ))
}

pub fn build_feedback_prompt(context: &InsightContext) -> Result<String, LlmError> {
    Ok(fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("percentage", context.percentage.to_string().as_str()),
            ("skill_scores_json", to_json(&context.skill_scores)?.as_str()),
            ("question_feedback_json", to_json(&context.question_feedback)?.as_str()),
            ("job_title", context.job_title.as_str()),
            ("candidate_name", context.candidate_name.as_str()),
        ],
    ))
}

#[async_trait]
impl JudgmentProvider for LlmAssessor {
    async fn judge_code(
        &self,
        question: &Question,
        answer: &Answer,
    ) -> Result<CodeJudgment, LlmError> {
        let prompt = build_code_prompt(question, answer)?;
        self.llm
            .call_json(&prompt, &system_prompt(CODE_REVIEW_SYSTEM))
            .await
    }

    async fn judge_text(
        &self,
        question: &Question,
        answer: &Answer,
    ) -> Result<TextJudgment, LlmError> {
        let prompt = build_text_prompt(question, answer);
        self.llm
            .call_json(&prompt, &system_prompt(TEXT_REVIEW_SYSTEM))
            .await
    }
}

#[async_trait]
impl InsightProvider for LlmAssessor {
    async fn reasoning(
        &self,
        context: &InsightContext,
        siblings: &[Application],
    ) -> Result<AiReasoning, LlmError> {
        let prompt = build_reasoning_prompt(context, siblings)?;
        self.llm
            .call_json(&prompt, &system_prompt(REASONING_SYSTEM))
            .await
    }

    async fn feedback(
        &self,
        context: &InsightContext,
        _siblings: &[Application],
    ) -> Result<FeedbackNarrative, LlmError> {
        let prompt = build_feedback_prompt(context)?;
        self.llm
            .call_json(&prompt, &system_prompt(FEEDBACK_SYSTEM))
            .await
    }
}
