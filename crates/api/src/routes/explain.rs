use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::error::ApiError;
use sched_core::scoring::compute_gap_scores;
use types::{InstanceId, InstanceInfo, StudentId};

/// A block ordering to score, e.g. after a manual rearrangement.
#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub blocks: Vec<Vec<InstanceId>>,
    pub instances: BTreeMap<InstanceId, InstanceInfo>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainOut {
    pub total_gap: i64,
    pub blocks: usize,
    pub students_scored: usize,
    pub gaps_by_student: BTreeMap<StudentId, i64>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
    (status = 200, description = "Student gap breakdown for the given ordering", body = ExplainOut),
    (status = 400, description = "Ordering references an unknown instance")
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Result<Json<ExplainOut>, ApiError> {
    let s = compute_gap_scores(&input.blocks, &input.instances).map_err(ApiError::bad_request)?;
    Ok(Json(ExplainOut {
        total_gap: s.total,
        blocks: input.blocks.len(),
        students_scored: s.students_scored,
        gaps_by_student: s.per_student,
    }))
}
