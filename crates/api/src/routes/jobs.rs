use axum::{extract::{Path, State}, Json};
use crate::{error::ApiError, state::AppState};
use jobs::JobStatus;
use types::ScheduleResult;

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Job status", body = JobStatus),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("job {id}")))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Schedule (if ready)", body = ScheduleResult),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.jobs.get(&id) {
        Some(JobStatus::Done { result }) => {
            Ok(Json(serde_json::to_value(result).map_err(ApiError::internal)?))
        }
        Some(JobStatus::Failed { message }) => {
            Ok(Json(serde_json::json!({"status": "failed", "message": message})))
        }
        Some(_) => Ok(Json(serde_json::json!({"status": "not_ready"}))),
        None => Err(ApiError::not_found(format!("job {id}"))),
    }
}
