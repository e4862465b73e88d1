use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::kernel::reindex::{RecordFilter, RecordStore};

use super::models::Job;

/// Postgres-backed record store for the job table.
#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for JobStore {
    type Record = Job;

    fn kind(&self) -> &'static str {
        "job"
    }

    async fn count_records(&self, filter: &RecordFilter) -> Result<i64> {
        Job::count_in_scope(filter.scope.as_deref(), filter.only_missing, &self.pool).await
    }

    async fn fetch_page(&self, filter: &RecordFilter, limit: i64, offset: i64) -> Result<Vec<Job>> {
        Job::fetch_page(
            filter.scope.as_deref(),
            filter.only_missing,
            limit,
            offset,
            &self.pool,
        )
        .await
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<Job>> {
        Job::find_by_ids(ids, &self.pool).await
    }

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()> {
        Job::update_embedding(id, embedding, &self.pool).await
    }
}
