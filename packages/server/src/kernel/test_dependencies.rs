// Test dependencies - mock implementations for testing
//
// Mock services that stand in for the OpenAI API, Postgres-backed record
// stores, and the JobsGlobal feed so engine and sync behavior can be tested
// without the network or a database.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use jobsglobal_client::{AdvertisementPayload, JobsGlobalError};

use super::embeddings::{input_preview, EmbeddingError};
use super::reindex::{EmbedRecord, RecordFilter, RecordStore};
use super::{BaseEmbeddingService, BaseJobSource};

// =============================================================================
// Mock Embedding Service
// =============================================================================

pub struct MockEmbeddingService {
    // Returned for every successful call
    fixed_embedding: Vec<f32>,
    // Inputs containing any of these substrings fail every time
    failing_patterns: Arc<Mutex<Vec<String>>>,
    // Remaining number of calls that fail before the service recovers
    transient_failures: Arc<Mutex<u32>>,
    // Track all texts that embeddings were requested for
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingService {
    pub fn new() -> Self {
        Self {
            fixed_embedding: vec![0.1; 1536],
            failing_patterns: Arc::new(Mutex::new(Vec::new())),
            transient_failures: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.fixed_embedding = embedding;
        self
    }

    /// Fail permanently for any input containing the pattern.
    pub fn with_failing_pattern(self, pattern: &str) -> Self {
        self.failing_patterns.lock().unwrap().push(pattern.to_string());
        self
    }

    /// Fail the next `count` calls with a rate-limit error, then recover.
    pub fn with_transient_failures(self, count: u32) -> Self {
        *self.transient_failures.lock().unwrap() = count;
        self
    }

    /// Get all texts that embeddings were requested for
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseEmbeddingService for MockEmbeddingService {
    async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        // Record the call
        self.calls.lock().unwrap().push(text.to_string());

        let mut transient = self.transient_failures.lock().unwrap();
        if *transient > 0 {
            *transient -= 1;
            return Err(EmbeddingError::Api {
                status: 429,
                preview: input_preview(text),
                body: "rate limited".to_string(),
            });
        }
        drop(transient);

        let patterns = self.failing_patterns.lock().unwrap();
        if patterns.iter().any(|p| text.contains(p.as_str())) {
            return Err(EmbeddingError::Api {
                status: 500,
                preview: input_preview(text),
                body: "simulated provider failure".to_string(),
            });
        }

        Ok(self.fixed_embedding.clone())
    }
}

// =============================================================================
// Mock Record Store
// =============================================================================

/// In-memory record with the same shape the engine cares about.
#[derive(Debug, Clone)]
pub struct MockRecord {
    pub id: i64,
    pub scope: Option<String>,
    pub title: String,
    pub description: String,
    pub has_embedding: bool,
}

impl EmbedRecord for MockRecord {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn has_embeddable_text(&self) -> bool {
        !(self.title.is_empty() && self.description.is_empty())
    }

    fn embedding_text(&self) -> String {
        format!("Title: {}. Description: {}", self.title, self.description)
    }
}

/// Record store over a shared Vec. Pages are filtered and sliced the way the
/// SQL store does it, and a successful update flips `has_embedding` so that
/// only-missing filters shrink as a real backfill run would.
#[derive(Clone)]
pub struct MockRecordStore {
    records: Arc<Mutex<Vec<MockRecord>>>,
    failing_update_ids: Arc<Mutex<Vec<i64>>>,
    page_fetches: Arc<Mutex<i64>>,
    updates: Arc<Mutex<Vec<(i64, Vec<f32>)>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            failing_update_ids: Arc::new(Mutex::new(Vec::new())),
            page_fetches: Arc::new(Mutex::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_records(self, records: Vec<MockRecord>) -> Self {
        self.records.lock().unwrap().extend(records);
        self
    }

    /// Seed `count` embeddable records without embeddings, ids continuing
    /// from whatever is already stored.
    pub fn with_embeddable_records(self, count: i64, scope: Option<&str>) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            let next_id = records.len() as i64 + 1;
            for i in 0..count {
                let id = next_id + i;
                records.push(MockRecord {
                    id,
                    scope: scope.map(str::to_string),
                    title: format!("Job {}", id),
                    description: format!("Description for job {}", id),
                    has_embedding: false,
                });
            }
        }
        self
    }

    /// Persistence failure for one record id.
    pub fn with_failing_update(self, id: i64) -> Self {
        self.failing_update_ids.lock().unwrap().push(id);
        self
    }

    /// Number of pages fetched across all runs
    pub fn page_fetches(&self) -> i64 {
        *self.page_fetches.lock().unwrap()
    }

    /// Ids whose embedding was written, in write order
    pub fn updated_ids(&self) -> Vec<i64> {
        self.updates.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    fn matches(record: &MockRecord, filter: &RecordFilter) -> bool {
        if let Some(scope) = &filter.scope {
            if record.scope.as_deref() != Some(scope.as_str()) {
                return false;
            }
        }
        if filter.only_missing && record.has_embedding {
            return false;
        }
        true
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    type Record = MockRecord;

    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn count_records(&self, filter: &RecordFilter) -> Result<i64> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| Self::matches(r, filter)).count() as i64)
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MockRecord>> {
        *self.page_fetches.lock().unwrap() += 1;

        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| Self::matches(r, filter))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<MockRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()> {
        if self.failing_update_ids.lock().unwrap().contains(&id) {
            bail!("simulated update failure for record {}", id);
        }

        self.updates.lock().unwrap().push((id, embedding.to_vec()));

        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.has_embedding = true;
        }
        Ok(())
    }
}

// =============================================================================
// Mock Job Source
// =============================================================================

pub struct MockJobSource {
    payloads: Arc<Mutex<Vec<AdvertisementPayload>>>,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockJobSource {
    pub fn new() -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a payload to return on the next fetch.
    pub fn with_payload(self, payload: AdvertisementPayload) -> Self {
        self.payloads.lock().unwrap().push(payload);
        self
    }

    /// Fail every fetch with an upstream API error.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Get all group ids that were fetched
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseJobSource for MockJobSource {
    async fn fetch_by_group_id(
        &self,
        job_group_id: &str,
    ) -> Result<AdvertisementPayload, JobsGlobalError> {
        // Record the call
        self.calls.lock().unwrap().push(job_group_id.to_string());

        if self.fail {
            return Err(JobsGlobalError::Api {
                status: 500,
                message: "simulated upstream failure".to_string(),
            });
        }

        let mut payloads = self.payloads.lock().unwrap();
        if !payloads.is_empty() {
            Ok(payloads.remove(0))
        } else {
            Ok(AdvertisementPayload::Many(vec![]))
        }
    }
}
