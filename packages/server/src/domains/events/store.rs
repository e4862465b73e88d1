use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::kernel::reindex::{RecordFilter, RecordStore};

use super::models::Event;

/// Postgres-backed record store for the event table. The event table has no
/// grouping column, so the filter's scope does not apply here.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for EventStore {
    type Record = Event;

    fn kind(&self) -> &'static str {
        "event"
    }

    async fn count_records(&self, filter: &RecordFilter) -> Result<i64> {
        if let Some(scope) = filter.scope.as_deref() {
            tracing::warn!(scope, "Scope does not apply to events, running unscoped");
        }
        Event::count(filter.only_missing, &self.pool).await
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>> {
        Event::fetch_page(filter.only_missing, limit, offset, &self.pool).await
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>> {
        Event::find_by_ids(ids, &self.pool).await
    }

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()> {
        Event::update_embedding(id, embedding, &self.pool).await
    }
}
