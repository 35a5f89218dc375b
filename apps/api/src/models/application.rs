use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of a candidate's application to a job.
///
/// ```text
/// applied -> assessment_pending -> assessment_completed -> under_review -> shortlisted
///    \______________________________^                                  \-> rejected
/// ```
///
/// `under_review` is entered only by result composition; `shortlisted` and
/// `rejected` only by a recruiter decision, and nothing leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    AssessmentPending,
    AssessmentCompleted,
    UnderReview,
    Shortlisted,
    Rejected,
}

#[derive(Debug, Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::AssessmentPending => "assessment_pending",
            Self::AssessmentCompleted => "assessment_completed",
            Self::UnderReview => "under_review",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shortlisted | Self::Rejected)
    }

    /// Candidates may submit without explicitly starting, so `applied` can
    /// jump straight to `assessment_completed`.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Applied, AssessmentPending)
                | (Applied, AssessmentCompleted)
                | (AssessmentPending, AssessmentCompleted)
                | (AssessmentCompleted, UnderReview)
                | (UnderReview, Shortlisted)
                | (UnderReview, Rejected)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(Self::Applied),
            "assessment_pending" => Ok(Self::AssessmentPending),
            "assessment_completed" => Ok(Self::AssessmentCompleted),
            "under_review" => Ok(Self::UnderReview),
            "shortlisted" => Ok(Self::Shortlisted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub assessment_started_at: Option<DateTime<Utc>>,
    pub assessment_completed_at: Option<DateTime<Utc>>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
