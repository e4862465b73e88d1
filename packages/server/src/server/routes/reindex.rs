use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::reindex::DEFAULT_REINDEX_BATCH_SIZE;
use crate::server::app::AppState;
use crate::server::routes::error_body;

#[derive(Debug, Default, Deserialize)]
pub struct ReindexRequest {
    pub scope: Option<String>,
    pub batch_size: Option<i64>,
}

#[derive(Serialize)]
pub struct ReindexResponse {
    pub total_processed: i64,
    pub total_jobs: i64,
    pub scope: Option<String>,
}

/// Full reindex of job embeddings, optionally scoped to one group.
///
/// The run executes on a spawned task and is awaited here: a client that
/// gives up waiting abandons the response, but the run continues to
/// completion server-side. Overlapping invocations are not locked out;
/// operators serialize administrative reindexes themselves.
pub async fn reindex_handler(
    Extension(state): Extension<AppState>,
    request: Option<Json<ReindexRequest>>,
) -> Result<Json<ReindexResponse>, (StatusCode, Json<Value>)> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let batch_size = request.batch_size.unwrap_or(DEFAULT_REINDEX_BATCH_SIZE);

    let engine = state.reindex_engine.clone();
    let scope = request.scope.clone();
    let summary = tokio::spawn(async move { engine.reindex(scope.as_deref(), batch_size).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Reindex task panicked or was cancelled");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Reindex task failed"),
            )
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Reindex run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Error reindexing embeddings: {}", e)),
            )
        })?;

    Ok(Json(ReindexResponse {
        total_processed: summary.total_processed,
        total_jobs: summary.total_records,
        scope: summary.scope,
    }))
}
