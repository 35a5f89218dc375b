use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqOption {
    pub option_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// Type-specific part of a question, tagged by `type` in the stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Mcq {
        options: Vec<McqOption>,
        /// Hidden from candidates; `None` only in a candidate view.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_option_id: Option<String>,
    },
    Coding {
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        test_cases: Vec<TestCase>,
        #[serde(default)]
        starter_code: Option<String>,
    },
    Descriptive,
    Situational,
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Mcq { .. } => "mcq",
            QuestionKind::Coding { .. } => "coding",
            QuestionKind::Descriptive => "descriptive",
            QuestionKind::Situational => "situational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub question_text: String,
    pub difficulty: Difficulty,
    pub points: u32,
    #[serde(default)]
    pub skill_tags: Vec<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Copy safe to show a candidate: no correct option, no hidden test cases.
    pub fn candidate_view(&self) -> Question {
        let kind = match &self.kind {
            QuestionKind::Mcq { options, .. } => QuestionKind::Mcq {
                options: options.clone(),
                correct_option_id: None,
            },
            QuestionKind::Coding {
                language,
                test_cases,
                starter_code,
            } => QuestionKind::Coding {
                language: language.clone(),
                test_cases: test_cases.iter().filter(|t| !t.is_hidden).cloned().collect(),
                starter_code: starter_code.clone(),
            },
            other => other.clone(),
        };
        Question {
            kind,
            ..self.clone()
        }
    }
}

fn default_total_points() -> u32 {
    100
}

fn default_duration() -> u32 {
    60
}

fn default_passing_score() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Authoritative maximum score; may differ from the sum of question points.
    #[serde(default = "default_total_points")]
    pub total_points: u32,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default = "default_true")]
    pub allow_practice_mode: bool,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration(),
            total_points: default_total_points(),
            passing_score: default_passing_score(),
            allow_practice_mode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    #[sqlx(json)]
    pub config: AssessmentConfig,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Constant-time lookup of questions by id.
    pub fn question_index(&self) -> HashMap<&str, &Question> {
        self.questions
            .iter()
            .map(|q| (q.question_id.as_str(), q))
            .collect()
    }

    pub fn candidate_view(&self) -> Assessment {
        Assessment {
            questions: self.questions.iter().map(Question::candidate_view).collect(),
            ..self.clone()
        }
    }
}
