use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domains::jobs::{Job, SyncError};
use crate::server::app::AppState;
use crate::server::routes::error_body;

#[derive(Deserialize)]
pub struct SyncJobsRequest {
    pub job_group_id: String,
}

#[derive(Serialize)]
pub struct SyncJobsResponse {
    pub success: bool,
    pub message: String,
    pub rows_affected: usize,
    pub jobs: Vec<Job>,
}

/// Sync one job group from the upstream feed into the job table, refreshing
/// embeddings for the rows that came back open.
pub async fn sync_jobs_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SyncJobsRequest>,
) -> Result<Json<SyncJobsResponse>, (StatusCode, Json<Value>)> {
    let report = state
        .sync_service
        .sync_group(&request.job_group_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_group_id = %request.job_group_id, "Sync failed");
            match e {
                SyncError::InvalidPayload => (StatusCode::BAD_REQUEST, error_body(e.to_string())),
                SyncError::Upstream(_) => (
                    StatusCode::BAD_GATEWAY,
                    error_body(format!("Error syncing jobs: {}", e)),
                ),
                SyncError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body(format!("Error syncing jobs: {}", e)),
                ),
            }
        })?;

    Ok(Json(SyncJobsResponse {
        success: true,
        message: format!("Successfully synced {} job(s)", report.jobs.len()),
        rows_affected: report.jobs.len(),
        jobs: report.jobs,
    }))
}
