use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Score for one answer. Derived on every evaluation run and stored only
/// inside its `ResultRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question_id: String,
    pub question_type: String,
    pub points_earned: f64,
    pub max_points: u32,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correctness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability_score: Option<f64>,
    pub ai_feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// True when the judgment collaborator failed and the fixed fallback was used.
    #[serde(default)]
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// advanced >= 80, intermediate >= 60, else beginner.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            SkillLevel::Advanced
        } else if percentage >= 60.0 {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill_name: String,
    pub earned_points: f64,
    pub max_points: f64,
    pub question_count: u32,
    /// Percentage in [0, 100], two decimals.
    pub score: f64,
    pub level: SkillLevel,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFactor {
    pub factor: String,
    pub impact: String,
    pub score: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasCheck {
    pub detected: bool,
    pub notes: String,
}

/// Reasoning produced for recruiters about a candidate's standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReasoning {
    pub overall_assessment: String,
    pub ranking_factors: Vec<RankingFactor>,
    /// In [0, 1].
    pub confidence_score: f64,
    pub bias_check: BiasCheck,
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
}

/// Narrative half of the candidate feedback report, as produced by the
/// feedback collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackNarrative {
    pub top_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub learning_resources: Vec<LearningResource>,
    pub improvement_plan: String,
    pub estimated_improvement_time: String,
    pub positive_message: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub overall_score: f64,
    /// Never computed at composition time.
    pub percentile: Option<f64>,
    pub skill_scores: Vec<SkillScore>,
    #[serde(flatten)]
    pub narrative: FeedbackNarrative,
}

/// The persisted outcome of evaluating one submission. Exactly one per
/// submission (unique on `submission_id`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResultRecord {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub application_id: Uuid,
    pub candidate_id: Uuid,
    pub assessment_id: Uuid,
    pub total_score: f64,
    pub max_score: i64,
    pub percentage: f64,
    #[sqlx(json)]
    pub question_evaluations: Vec<QuestionEvaluation>,
    #[sqlx(json)]
    pub ai_reasoning: AiReasoning,
    #[sqlx(json)]
    pub feedback_report: FeedbackReport,
    pub rank: Option<i64>,
    pub total_candidates: Option<i64>,
    pub is_shortlisted: bool,
    pub evaluated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
