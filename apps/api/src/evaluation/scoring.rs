//! Scoring policy: one answer + its question -> points earned.
//!
//! MCQ answers are checked locally. Coding and free-text answers arrive here
//! already judged (or replaced by the fallback judgment) and are folded into
//! a 0-100 composite with fixed weights, then scaled to the question's points.

use serde::{Deserialize, Serialize};

use crate::evaluation::judge::{CodeJudgment, TextJudgment};
use crate::models::assessment::Question;
use crate::models::result::QuestionEvaluation;
use crate::models::submission::Answer;

/// Free-text answers count as correct at or above this composite.
pub const TEXT_PASS_COMPOSITE: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeWeights {
    pub correctness: f64,
    pub efficiency: f64,
    pub readability: f64,
    pub edge_cases: f64,
}

impl Default for CodeWeights {
    fn default() -> Self {
        Self {
            correctness: 0.40,
            efficiency: 0.30,
            readability: 0.20,
            edge_cases: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextWeights {
    pub relevance: f64,
    pub communication: f64,
    pub critical_thinking: f64,
    pub professionalism: f64,
}

impl Default for TextWeights {
    fn default() -> Self {
        Self {
            relevance: 0.30,
            communication: 0.30,
            critical_thinking: 0.25,
            professionalism: 0.15,
        }
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round(part / whole * 100, 2)`, or 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

pub fn code_composite(judgment: &CodeJudgment, weights: &CodeWeights) -> f64 {
    weights.correctness * judgment.correctness_score
        + weights.efficiency * judgment.efficiency_score
        + weights.readability * judgment.readability_score
        + weights.edge_cases * judgment.edge_case_score
}

pub fn text_composite(judgment: &TextJudgment, weights: &TextWeights) -> f64 {
    weights.relevance * judgment.relevance_score
        + weights.communication * judgment.communication_score
        + weights.critical_thinking * judgment.critical_thinking_score
        + weights.professionalism * judgment.professionalism_score
}

/// Scales a 0-100 composite to the question's points, two decimals.
pub fn scaled_points(composite: f64, points: u32) -> f64 {
    let max = f64::from(points);
    round2(composite / 100.0 * max).clamp(0.0, max)
}

pub fn score_choice(
    question: &Question,
    correct_option_id: Option<&str>,
    answer: &Answer,
) -> QuestionEvaluation {
    let is_correct = match (answer.payload.selected_option(), correct_option_id) {
        (Some(selected), Some(correct)) => selected == correct,
        _ => false,
    };

    let (feedback, strengths, improvements) = if is_correct {
        ("Correct answer!", vec!["Quick response".to_string()], vec![])
    } else {
        (
            "Incorrect. Review this topic.",
            vec![],
            vec!["Review the concept".to_string()],
        )
    };

    QuestionEvaluation {
        question_id: question.question_id.clone(),
        question_type: question.kind.label().to_string(),
        points_earned: if is_correct { f64::from(question.points) } else { 0.0 },
        max_points: question.points,
        is_correct,
        correctness_score: None,
        efficiency_score: None,
        readability_score: None,
        ai_feedback: feedback.to_string(),
        strengths,
        improvements,
        used_fallback: false,
    }
}

pub fn score_code(
    question: &Question,
    judgment: CodeJudgment,
    used_fallback: bool,
) -> QuestionEvaluation {
    let composite = code_composite(&judgment, &CodeWeights::default());

    QuestionEvaluation {
        question_id: question.question_id.clone(),
        question_type: question.kind.label().to_string(),
        points_earned: scaled_points(composite, question.points),
        max_points: question.points,
        is_correct: judgment.is_correct,
        correctness_score: Some(judgment.correctness_score),
        efficiency_score: Some(judgment.efficiency_score),
        readability_score: Some(judgment.readability_score),
        ai_feedback: judgment.detailed_feedback,
        strengths: judgment.strengths,
        improvements: judgment.improvements,
        used_fallback,
    }
}

pub fn score_text(
    question: &Question,
    judgment: TextJudgment,
    used_fallback: bool,
) -> QuestionEvaluation {
    let composite = text_composite(&judgment, &TextWeights::default());

    QuestionEvaluation {
        question_id: question.question_id.clone(),
        question_type: question.kind.label().to_string(),
        points_earned: scaled_points(composite, question.points),
        max_points: question.points,
        is_correct: composite >= TEXT_PASS_COMPOSITE,
        correctness_score: None,
        efficiency_score: None,
        readability_score: None,
        ai_feedback: judgment.detailed_feedback,
        strengths: judgment.strengths,
        improvements: judgment.improvements,
        used_fallback,
    }
}
