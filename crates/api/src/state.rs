use jobs::InMemJobs;
use solver_blocks::MovingScheduler;
use std::sync::Arc;
use types::ScheduleRequest;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<MovingScheduler>>,
    pub max_iterations: u32,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let jobs = InMemJobs::with_retention(MovingScheduler::new(), cfg.retained_jobs);
        Self {
            jobs: Arc::new(jobs),
            max_iterations: cfg.max_sequence_iterations,
        }
    }

    /// Clamps client-requested swap iterations to the configured ceiling.
    pub fn capped(&self, mut req: ScheduleRequest) -> ScheduleRequest {
        if req.params.sequence_iterations > self.max_iterations {
            tracing::debug!(
                requested = req.params.sequence_iterations,
                cap = self.max_iterations,
                "sequence iterations capped"
            );
            req.params.sequence_iterations = self.max_iterations;
        }
        req
    }
}
