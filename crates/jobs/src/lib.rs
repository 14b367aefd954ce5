use parking_lot::RwLock;
use sched_core::{ScheduleRequest, ScheduleResult, Scheduler};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done { result: ScheduleResult },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Done { .. } | JobStatus::Failed { .. })
    }
}

pub const DEFAULT_RETAINED_JOBS: usize = 256;

/// Job statuses plus the completion order of finished jobs. Only the newest
/// `retain` finished entries are kept; queued and running jobs are never evicted.
#[derive(Default)]
struct JobTable {
    statuses: HashMap<String, JobStatus>,
    finished: VecDeque<String>,
    retain: usize,
}

impl JobTable {
    fn with_retention(retain: usize) -> Self {
        Self {
            retain,
            ..Default::default()
        }
    }

    fn finish(&mut self, id: String, status: JobStatus) {
        self.finished.push_back(id.clone());
        self.statuses.insert(id, status);
        while self.finished.len() > self.retain {
            if let Some(old) = self.finished.pop_front() {
                self.statuses.remove(&old);
            }
        }
    }
}

/// Scheduling runs tracked in memory. Each run executes on the blocking pool.
pub struct InMemJobs<S: Scheduler> {
    inner: Arc<RwLock<JobTable>>,
    scheduler: Arc<S>,
}

impl<S: Scheduler> Clone for InMemJobs<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: Scheduler> InMemJobs<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_retention(scheduler, DEFAULT_RETAINED_JOBS)
    }

    pub fn with_retention(scheduler: S, max_finished: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(JobTable::with_retention(max_finished))),
            scheduler: Arc::new(scheduler),
        }
    }

    pub fn scheduler(&self) -> Arc<S> {
        self.scheduler.clone()
    }

    pub fn enqueue(&self, req: ScheduleRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .statuses
            .insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let scheduler = self.scheduler.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write()
                .statuses
                .insert(id_for_task.clone(), JobStatus::Running);

            let outcome = tokio::task::spawn_blocking(move || scheduler.schedule(req))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|r| r);

            let status = match outcome {
                Ok(result) => {
                    info!(
                        job = %id_for_task,
                        blocks = result.metrics.total_blocks,
                        "job finished"
                    );
                    JobStatus::Done { result }
                }
                Err(e) => {
                    error!(job = %id_for_task, ?e, "job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };
            map.write().finish(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().statuses.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().statuses.is_empty()
    }
}
