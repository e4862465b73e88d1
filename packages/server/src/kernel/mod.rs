//! Kernel module - server infrastructure and dependencies.

pub mod embeddings;
pub mod reindex;
pub mod test_dependencies;
pub mod traits;

pub use embeddings::{EmbeddingError, EmbeddingService, EMBEDDING_DIM};
pub use reindex::{
    normalize_scope, BatchCursor, EmbedRecord, RecordFilter, RecordStore, ReindexConfig,
    ReindexEngine, ReindexSummary, DEFAULT_BACKFILL_BATCH_SIZE, DEFAULT_REINDEX_BATCH_SIZE,
};
pub use traits::*;
