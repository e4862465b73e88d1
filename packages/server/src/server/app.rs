//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use jobsglobal_client::JobsGlobalClient;

use crate::domains::jobs::{JobStore, JobSyncService};
use crate::kernel::{BaseEmbeddingService, BaseJobSource, EmbeddingService, ReindexEngine};
use crate::server::routes::{
    health_handler, job_groups_handler, jobs_by_group_handler, reindex_handler, root_handler,
    stats_handler, sync_jobs_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sync_service: Arc<JobSyncService>,
    pub reindex_engine: Arc<ReindexEngine<JobStore>>,
}

/// Build the Axum application router
pub fn build_app(
    pool: PgPool,
    openai_api_key: String,
    embedding_model: String,
    jobsglobal_api_url: String,
    jobsglobal_bearer_token: String,
    allowed_origins: Vec<String>,
) -> Router {
    // One embedding service and one engine, shared by the post-sync trigger
    // and the administrative reindex endpoint
    let embedder: Arc<dyn BaseEmbeddingService> =
        Arc::new(EmbeddingService::new(openai_api_key, embedding_model));
    let reindex_engine = Arc::new(ReindexEngine::new(JobStore::new(pool.clone()), embedder));

    let source: Arc<dyn BaseJobSource> = Arc::new(JobsGlobalClient::new(
        jobsglobal_api_url,
        jobsglobal_bearer_token,
    ));
    let sync_service = Arc::new(JobSyncService::new(
        pool.clone(),
        source,
        reindex_engine.clone(),
    ));

    let app_state = AppState {
        db_pool: pool,
        sync_service,
        reindex_engine,
    };

    // CORS restricted to the configured frontend origins
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/sync-jobs", post(sync_jobs_handler))
        .route("/api/job-groups", get(job_groups_handler))
        .route(
            "/api/job-groups/:job_group_id/jobs",
            get(jobs_by_group_handler),
        )
        .route("/api/stats", get(stats_handler))
        .route("/api/reindex-embeddings", post(reindex_handler))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
