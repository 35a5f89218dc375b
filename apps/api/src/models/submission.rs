use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The single populated answer payload, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPayload {
    Choice {
        selected_option_id: String,
    },
    Code {
        code: String,
        #[serde(default)]
        language: Option<String>,
    },
    Text {
        text_answer: String,
    },
}

impl AnswerPayload {
    pub fn selected_option(&self) -> Option<&str> {
        match self {
            AnswerPayload::Choice { selected_option_id } => Some(selected_option_id),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            AnswerPayload::Code { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            AnswerPayload::Text { text_answer } => Some(text_answer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    #[serde(flatten)]
    pub payload: AnswerPayload,
    #[serde(default)]
    pub time_spent_seconds: u32,
}

/// One candidate's answers for an assessment. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub application_id: Uuid,
    pub assessment_id: Uuid,
    pub candidate_id: Uuid,
    #[sqlx(json)]
    pub answers: Vec<Answer>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub total_time_seconds: i64,
    pub is_practice: bool,
}
