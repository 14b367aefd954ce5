use crate::{error::ApiError, state::AppState};
use axum::{extract::State, Json};
use sched_core::Scheduler;
use serde::Serialize;
use types::{ScheduleRequest, ScheduleResult};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
        post,
        path = "/v1/schedule",
        request_body = ScheduleRequest,
        responses(
            (status = 200, description = "Block schedule", body = ScheduleResult),
            (status = 500, description = "Scheduler failed")
        )
    )]
pub async fn schedule(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResult>, ApiError> {
    let req = state.capped(req);
    let scheduler = state.jobs.scheduler();
    let result = tokio::task::spawn_blocking(move || scheduler.schedule(req))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;
    Ok(Json(result))
}

#[utoipa::path(
        post,
        path = "/v1/jobs",
        request_body = ScheduleRequest,
        responses((status = 200, description = "Job enqueued", body = JobCreated))
    )]
pub async fn enqueue(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Json<JobCreated> {
    let id = state.jobs.enqueue(state.capped(req));
    Json(JobCreated {
        job_id: id.0,
        status: "queued",
    })
}
