use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::store::HiringStore;

/// A recruiter's verdict on a reviewed application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Shortlist,
    Reject,
}

impl Decision {
    pub fn target(self) -> ApplicationStatus {
        match self {
            Decision::Shortlist => ApplicationStatus::Shortlisted,
            Decision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Applies `decision`. Only `under_review` applications can be decided, and
/// a decision is final.
pub async fn decide(
    store: &dyn HiringStore,
    application_id: Uuid,
    decision: Decision,
) -> Result<Application, AppError> {
    let application = store
        .application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let to = decision.target();
    if !application.status.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            from: application.status,
            to,
        });
    }

    if !store
        .transition_application(application_id, application.status, to, Utc::now())
        .await?
    {
        return Err(AppError::Conflict(
            "Application status changed concurrently".to_string(),
        ));
    }
    if decision == Decision::Shortlist {
        store.set_shortlisted(application_id, true).await?;
    }
    info!("Application {application_id} moved to {to}");

    store
        .application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}
