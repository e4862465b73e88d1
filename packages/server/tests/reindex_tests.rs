//! Reindex engine behavior over mock stores and providers.

use std::sync::Arc;
use std::time::Duration;

use server_core::kernel::test_dependencies::{MockEmbeddingService, MockRecord, MockRecordStore};
use server_core::kernel::{ReindexConfig, ReindexEngine};

/// Millisecond backoff keeps retry scenarios fast.
fn test_config() -> ReindexConfig {
    ReindexConfig {
        max_retries: 3,
        retry_delay: Duration::from_millis(1),
    }
}

fn engine(
    store: &MockRecordStore,
    embedder: &Arc<MockEmbeddingService>,
) -> ReindexEngine<MockRecordStore> {
    ReindexEngine::with_config(store.clone(), embedder.clone(), test_config())
}

fn record(id: i64, scope: Option<&str>, title: &str, description: &str) -> MockRecord {
    MockRecord {
        id,
        scope: scope.map(str::to_string),
        title: title.to_string(),
        description: description.to_string(),
        has_embedding: false,
    }
}

#[tokio::test]
async fn total_matches_store_count_for_any_batch_size() {
    let store = MockRecordStore::new().with_embeddable_records(10, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let wide = engine.reindex(None, 50).await.expect("run should complete");
    let narrow = engine.reindex(None, 7).await.expect("run should complete");

    assert_eq!(wide.total_records, 10);
    assert_eq!(narrow.total_records, 10);
    assert_eq!(wide.total_processed, 10);
    assert_eq!(narrow.total_processed, 10);
}

#[tokio::test]
async fn back_to_back_runs_process_the_same_count() {
    let store = MockRecordStore::new().with_embeddable_records(6, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let first = engine.reindex(None, 50).await.expect("run should complete");
    let second = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(first.total_processed, second.total_processed);
    assert_eq!(first, second);
}

#[tokio::test]
async fn degenerate_records_are_counted_but_never_embedded() {
    let store = MockRecordStore::new().with_records(vec![
        record(1, None, "Cook", "Prepare meals for site staff"),
        record(2, None, "", ""),
        record(3, None, "Driver", "Heavy vehicle license required"),
    ]);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.total_processed, 2);
    // The empty record never reached the provider
    assert_eq!(embedder.call_count(), 2);
    assert_eq!(store.updated_ids(), vec![1, 3]);
}

#[tokio::test]
async fn blank_scope_is_equivalent_to_unscoped() {
    let store = MockRecordStore::new().with_embeddable_records(4, Some("GRP-1"));
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let none = engine.reindex(None, 50).await.expect("run should complete");
    let empty = engine.reindex(Some(""), 50).await.expect("run should complete");
    let blank = engine.reindex(Some("   "), 50).await.expect("run should complete");

    assert_eq!(none, empty);
    assert_eq!(empty, blank);
    assert_eq!(none.scope, None);
    assert_eq!(none.total_records, 4);
}

#[tokio::test]
async fn scoped_run_only_touches_the_scope() {
    let store = MockRecordStore::new().with_records(vec![
        record(1, Some("GROUP-7"), "Cook", "Prepare meals"),
        record(2, Some("GROUP-7"), "Waiter", "Serve guests"),
        record(3, Some("GROUP-7"), "Cleaner", "Housekeeping"),
        record(4, Some("GROUP-7"), "", ""),
        record(5, Some("GROUP-7"), "", ""),
        record(6, Some("OTHER"), "Welder", "MIG and TIG"),
        record(7, Some("OTHER"), "Mason", "Block work"),
    ]);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine
        .reindex(Some("  GROUP-7  "), 50)
        .await
        .expect("run should complete");

    assert_eq!(summary.scope.as_deref(), Some("GROUP-7"));
    assert_eq!(summary.total_records, 5);
    assert_eq!(summary.total_processed, 3);
    assert_eq!(store.updated_ids(), vec![1, 2, 3]);
}

#[tokio::test]
async fn pages_are_fetched_until_the_count_snapshot() {
    let store = MockRecordStore::new().with_embeddable_records(120, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_records, 120);
    assert_eq!(summary.total_processed, 120);
    // 50 + 50 + 20, no fourth fetch past the snapshot
    assert_eq!(store.page_fetches(), 3);
}

#[tokio::test]
async fn empty_store_completes_without_fetching() {
    let store = MockRecordStore::new();
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_records, 0);
    assert_eq!(summary.total_processed, 0);
    assert_eq!(store.page_fetches(), 0);
}

#[tokio::test]
async fn zero_batch_size_is_clamped() {
    let store = MockRecordStore::new().with_embeddable_records(3, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 0).await.expect("run should complete");

    assert_eq!(summary.total_processed, 3);
    assert_eq!(store.page_fetches(), 3);
}

#[tokio::test]
async fn provider_failure_skips_the_record_and_the_run_completes() {
    let store = MockRecordStore::new().with_embeddable_records(10, None);
    let embedder = Arc::new(MockEmbeddingService::new().with_failing_pattern("Job 7"));
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_records, 10);
    assert_eq!(summary.total_processed, 9);
    assert!(!store.updated_ids().contains(&7));
    assert_eq!(store.updated_ids().len(), 9);
}

#[tokio::test]
async fn update_failure_skips_the_record_and_the_run_completes() {
    let store = MockRecordStore::new()
        .with_embeddable_records(10, None)
        .with_failing_update(4);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_processed, 9);
    // The provider was still consulted for the record that failed to persist
    assert_eq!(embedder.call_count(), 10);
    assert!(!store.updated_ids().contains(&4));
}

#[tokio::test]
async fn backfill_only_touches_records_missing_embeddings() {
    let mut records: Vec<MockRecord> = (1..=10)
        .map(|id| record(id, None, &format!("Job {}", id), "text"))
        .collect();
    for pre_embedded in records.iter_mut().take(4) {
        pre_embedded.has_embedding = true;
    }
    let store = MockRecordStore::new().with_records(records);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let summary = engine.backfill_missing(100).await.expect("run should complete");

    assert_eq!(summary.total_records, 6);
    assert_eq!(summary.total_processed, 6);
    assert_eq!(summary.scope, None);
    assert_eq!(store.updated_ids(), vec![5, 6, 7, 8, 9, 10]);
}

#[tokio::test]
async fn backfill_shrinking_filter_ends_at_first_empty_page() {
    // Each update removes the record from the only-missing filter, so offset
    // paging walks past the survivors. The run ends early instead of looping;
    // a second invocation picks up the rest.
    let store = MockRecordStore::new().with_embeddable_records(6, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let first = engine.backfill_missing(3).await.expect("run should complete");
    assert_eq!(first.total_records, 6);
    assert_eq!(first.total_processed, 3);

    let second = engine.backfill_missing(3).await.expect("run should complete");
    assert_eq!(second.total_records, 3);
    assert_eq!(second.total_processed, 3);
}

#[tokio::test]
async fn transient_provider_failures_are_retried_within_budget() {
    let store = MockRecordStore::new().with_embeddable_records(1, None);
    let embedder = Arc::new(MockEmbeddingService::new().with_transient_failures(2));
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_processed, 1);
    // Initial attempt plus two retries
    assert_eq!(embedder.call_count(), 3);
}

#[tokio::test]
async fn exhausted_retries_skip_the_record() {
    let store = MockRecordStore::new().with_embeddable_records(1, None);
    let embedder = Arc::new(MockEmbeddingService::new().with_transient_failures(10));
    let engine = engine(&store, &embedder);

    let summary = engine.reindex(None, 50).await.expect("run should complete");

    assert_eq!(summary.total_processed, 0);
    // Initial attempt plus the full retry budget
    assert_eq!(embedder.call_count(), 4);
    assert!(store.updated_ids().is_empty());
}

#[tokio::test]
async fn reindex_ids_touches_exactly_the_given_rows() {
    let store = MockRecordStore::new().with_embeddable_records(5, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    let updated = engine.reindex_ids(&[1, 3]).await.expect("run should complete");

    assert_eq!(updated, 2);
    assert_eq!(store.updated_ids(), vec![1, 3]);
}

#[tokio::test]
async fn reindex_ids_with_no_ids_is_a_noop() {
    let store = MockRecordStore::new().with_embeddable_records(5, None);
    let embedder = Arc::new(MockEmbeddingService::new());
    let engine = engine(&store, &embedder);

    assert_eq!(engine.reindex_ids(&[]).await.expect("noop"), 0);
    assert_eq!(engine.reindex_ids(&[99]).await.expect("unknown id"), 0);
    assert_eq!(embedder.call_count(), 0);
}
