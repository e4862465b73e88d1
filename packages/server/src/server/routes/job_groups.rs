use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::domains::jobs::{Job, JobGroupFilter, JobGroupSummary, SummaryStats};
use crate::server::app::AppState;
use crate::server::routes::error_body;

/// Group listing for the dashboard table.
pub async fn job_groups_handler(
    Extension(state): Extension<AppState>,
    Query(filter): Query<JobGroupFilter>,
) -> Result<Json<Vec<JobGroupSummary>>, (StatusCode, Json<Value>)> {
    let groups = JobGroupSummary::list(&filter, &state.db_pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list job groups");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Error fetching job groups: {}", e)),
            )
        })?;
    Ok(Json(groups))
}

/// All jobs in one group, for the detail modal.
pub async fn jobs_by_group_handler(
    Extension(state): Extension<AppState>,
    Path(job_group_id): Path<String>,
) -> Result<Json<Vec<Job>>, (StatusCode, Json<Value>)> {
    let jobs = Job::find_by_group_id(&job_group_id, &state.db_pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_group_id, "Failed to fetch jobs for group");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Error fetching jobs: {}", e)),
            )
        })?;
    Ok(Json(jobs))
}

/// Corpus-wide counters for the dashboard header.
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<SummaryStats>, (StatusCode, Json<Value>)> {
    let stats = SummaryStats::fetch(&state.db_pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch summary stats");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(format!("Error fetching stats: {}", e)),
        )
    })?;
    Ok(Json(stats))
}
