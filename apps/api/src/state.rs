use std::sync::Arc;

use crate::queue::JobQueue;
use crate::store::HiringStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HiringStore>,
    /// Evaluation jobs are pushed here; workers consume them out of band.
    pub queue: Arc<dyn JobQueue>,
}
