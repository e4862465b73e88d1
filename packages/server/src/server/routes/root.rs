use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    message: String,
}

/// Service banner, used by uptime checks.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Job List Update API is running".to_string(),
    })
}
