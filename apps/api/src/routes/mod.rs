pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::results::handlers as results;
use crate::state::AppState;
use crate::submissions::handlers as submissions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate side
        .route("/api/v1/assessments/:id", get(submissions::handle_get_assessment))
        .route("/api/v1/submissions", post(submissions::handle_submit))
        .route(
            "/api/v1/submissions/start/:application_id",
            post(submissions::handle_start),
        )
        .route("/api/v1/submissions/:id", get(submissions::handle_get_submission))
        // Results
        .route(
            "/api/v1/results/application/:application_id",
            get(results::handle_result_for_application),
        )
        .route(
            "/api/v1/results/job/:job_id/rankings",
            get(results::handle_job_rankings),
        )
        // Recruiter decisions
        .route(
            "/api/v1/applications/:id/shortlist",
            post(results::handle_shortlist),
        )
        .route("/api/v1/applications/:id/reject", post(results::handle_reject))
        .with_state(state)
}
