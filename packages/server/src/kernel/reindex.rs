//! Generic embedding reindex engine.
//!
//! Drives batched embedding maintenance for any record kind that can describe
//! itself as text: the post-sync refresh for freshly upserted jobs, the
//! administrative full reindex, and the incremental backfill sweep all run
//! through the same engine. Record kinds plug in via [`EmbedRecord`] (identity
//! and text composition) and [`RecordStore`] (count/page/update SQL).
//!
//! A run is strictly sequential: one record at a time, one page at a time. No
//! error aborts a run; provider and persistence failures skip the record and
//! the summary reports how many records were actually written.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::time::sleep;

use crate::kernel::embeddings::EmbeddingError;
use crate::kernel::BaseEmbeddingService;

/// Page size for an administrative full reindex.
pub const DEFAULT_REINDEX_BATCH_SIZE: i64 = 50;
/// Page size for the incremental backfill sweep.
pub const DEFAULT_BACKFILL_BATCH_SIZE: i64 = 100;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

/// A record kind that can be embedded.
pub trait EmbedRecord: Send + Sync {
    /// Store-assigned identity, used for targeted embedding updates.
    fn record_id(&self) -> i64;

    /// False when every primary text field is empty. Such records are skipped
    /// without ever reaching the provider.
    fn has_embeddable_text(&self) -> bool;

    /// Compose the fixed field template submitted to the embedding model.
    /// Callers check `has_embeddable_text` first; this does not re-check.
    fn embedding_text(&self) -> String;
}

/// Predicate for count and page queries.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Equality filter on the record kind's grouping key. None means all.
    pub scope: Option<String>,
    /// When true, only records currently lacking an embedding.
    pub only_missing: bool,
}

/// Storage operations the engine needs for one record kind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Record: EmbedRecord;

    /// Short record-kind name for log lines ("job", "event").
    fn kind(&self) -> &'static str;

    async fn count_records(&self, filter: &RecordFilter) -> Result<i64>;

    /// One page in a stable total order (ordered by id).
    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self::Record>>;

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<Self::Record>>;

    /// Targeted single-column update; never a full-row replace.
    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()>;
}

/// Offset/limit pager over a filtered record set.
///
/// The total count is snapshotted once at creation and becomes the run's
/// iteration ceiling: rows inserted after that are not picked up, and a set
/// that shrinks mid-run (an only-missing sweep consumes its own predicate)
/// ends the cursor early at the first empty page. Not restartable.
pub struct BatchCursor<'a, S: RecordStore> {
    store: &'a S,
    filter: RecordFilter,
    batch_size: i64,
    total: i64,
    offset: i64,
}

impl<'a, S: RecordStore> BatchCursor<'a, S> {
    pub async fn new(store: &'a S, filter: RecordFilter, batch_size: i64) -> Result<Self> {
        let total = store.count_records(&filter).await?;
        Ok(Self {
            store,
            filter,
            batch_size,
            total,
            offset: 0,
        })
    }

    /// The count snapshot taken at creation.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Fetch the next page, or None once the cursor is exhausted: either the
    /// offset reached the snapshot total or the store returned an empty page,
    /// whichever comes first.
    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Record>>> {
        if self.offset >= self.total {
            return Ok(None);
        }

        let page = self
            .store
            .fetch_page(&self.filter, self.batch_size, self.offset)
            .await?;
        if page.is_empty() {
            return Ok(None);
        }

        self.offset += self.batch_size;
        Ok(Some(page))
    }
}

/// Retry budget for provider calls.
#[derive(Debug, Clone)]
pub struct ReindexConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

/// Outcome of one reindex run. `total_processed` counts records whose
/// embedding was actually written; comparing it against `total_records`
/// detects partial completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReindexSummary {
    pub total_processed: i64,
    pub total_records: i64,
    pub scope: Option<String>,
}

/// Orchestrates cursor paging, text composition, provider calls, and targeted
/// embedding updates for one record kind. Holds no locks and no cross-run
/// state; callers that must avoid overlapping administrative runs serialize
/// them themselves.
pub struct ReindexEngine<S: RecordStore> {
    store: S,
    embedder: Arc<dyn BaseEmbeddingService>,
    config: ReindexConfig,
}

impl<S: RecordStore> ReindexEngine<S> {
    pub fn new(store: S, embedder: Arc<dyn BaseEmbeddingService>) -> Self {
        Self {
            store,
            embedder,
            config: ReindexConfig::default(),
        }
    }

    pub fn with_config(
        store: S,
        embedder: Arc<dyn BaseEmbeddingService>,
        config: ReindexConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Full reindex: re-embed and overwrite every record in scope. An empty
    /// or whitespace-only scope means unscoped.
    pub async fn reindex(&self, scope: Option<&str>, batch_size: i64) -> Result<ReindexSummary> {
        let filter = RecordFilter {
            scope: normalize_scope(scope),
            only_missing: false,
        };
        self.run(filter, batch_size).await
    }

    /// Incremental sweep: embed only records currently lacking a vector.
    pub async fn backfill_missing(&self, batch_size: i64) -> Result<ReindexSummary> {
        let filter = RecordFilter {
            scope: None,
            only_missing: true,
        };
        self.run(filter, batch_size).await
    }

    async fn run(&self, filter: RecordFilter, batch_size: i64) -> Result<ReindexSummary> {
        let batch_size = batch_size.max(1);
        let mut cursor = BatchCursor::new(&self.store, filter.clone(), batch_size).await?;
        let total_records = cursor.total();

        tracing::info!(
            kind = self.store.kind(),
            scope = ?filter.scope,
            only_missing = filter.only_missing,
            total_records,
            batch_size,
            "Starting reindex run"
        );

        let mut total_processed = 0i64;
        let mut offset = 0i64;
        while let Some(page) = cursor.next_page().await? {
            tracing::info!(
                kind = self.store.kind(),
                offset,
                page_len = page.len(),
                "Processing batch"
            );

            for record in &page {
                if self.embed_record(record).await {
                    total_processed += 1;
                }
            }
            offset += batch_size;
        }

        tracing::info!(
            kind = self.store.kind(),
            total_processed,
            total_records,
            "Reindex run complete"
        );

        Ok(ReindexSummary {
            total_processed,
            total_records,
            scope: filter.scope,
        })
    }

    /// Re-embed an explicit id list (no paging; the caller's own batch bounds
    /// the size). Returns the number of embeddings written.
    pub async fn reindex_ids(&self, ids: &[i64]) -> Result<i64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let records = self.store.fetch_by_ids(ids).await?;
        if records.is_empty() {
            tracing::warn!(kind = self.store.kind(), ids = ?ids, "No records found for ids");
            return Ok(0);
        }

        tracing::info!(
            kind = self.store.kind(),
            count = records.len(),
            "Rebuilding embeddings for id list"
        );

        let mut updated = 0i64;
        for record in &records {
            if self.embed_record(record).await {
                updated += 1;
            }
        }

        tracing::info!(kind = self.store.kind(), updated, "Rebuilt embeddings");
        Ok(updated)
    }

    /// Skip/compose/embed/update for one record. True when the embedding was
    /// written. Every failure path logs and returns false; nothing here can
    /// abort the surrounding run.
    async fn embed_record(&self, record: &S::Record) -> bool {
        let id = record.record_id();

        if !record.has_embeddable_text() {
            tracing::warn!(
                kind = self.store.kind(),
                id,
                "Record has no title or description, skipping"
            );
            return false;
        }

        let text = record.embedding_text();
        let embedding = match self.generate_with_retry(&text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = self.store.kind(),
                    id,
                    "Failed to generate embedding, skipping record"
                );
                return false;
            }
        };

        match self.store.update_embedding(id, &embedding).await {
            Ok(()) => {
                tracing::debug!(kind = self.store.kind(), id, "Updated embedding");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = self.store.kind(),
                    id,
                    "Failed to save embedding"
                );
                false
            }
        }
    }

    /// Provider call with bounded retries and exponential backoff. Transient
    /// provider errors get another chance; the budget exhausted, the record
    /// is skipped until a later run.
    async fn generate_with_retry(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut retries = 0;

        loop {
            match self.embedder.generate(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) if retries < self.config.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.config.max_retries,
                        "Failed to generate embedding, retrying..."
                    );
                    sleep(self.config.retry_delay * 2u32.pow(retries - 1)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Trim the scope; empty becomes unscoped.
pub fn normalize_scope(scope: Option<&str>) -> Option<String> {
    scope
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_normalizes_to_unscoped() {
        assert_eq!(normalize_scope(None), None);
        assert_eq!(normalize_scope(Some("")), None);
        assert_eq!(normalize_scope(Some("   ")), None);
    }

    #[test]
    fn scope_is_trimmed() {
        assert_eq!(normalize_scope(Some("  GRP-7  ")), Some("GRP-7".to_string()));
        assert_eq!(normalize_scope(Some("GRP-7")), Some("GRP-7".to_string()));
    }

    #[test]
    fn default_config_matches_provider_budget() {
        let config = ReindexConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(1000));
    }
}
