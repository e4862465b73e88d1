//! Group sync from the upstream feed.
//!
//! Fetch advertisements for one group, upsert them keyed on job_post_id, then
//! refresh embeddings inline for the rows that came back in the active state.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use jobsglobal_client::{AdvertisementPayload, JobsGlobalError};

use crate::domains::jobs::mapper;
use crate::domains::jobs::models::{Job, NewJob, STATUS_OPEN};
use crate::domains::jobs::store::JobStore;
use crate::kernel::reindex::ReindexEngine;
use crate::kernel::BaseJobSource;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Upstream replied with a payload that is neither a list nor a job object.
    #[error("Invalid API response format")]
    InvalidPayload,

    #[error(transparent)]
    Upstream(#[from] JobsGlobalError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Result of one group sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub jobs: Vec<Job>,
    pub embeddings_updated: i64,
}

pub struct JobSyncService {
    pool: PgPool,
    source: Arc<dyn BaseJobSource>,
    engine: Arc<ReindexEngine<JobStore>>,
}

impl JobSyncService {
    pub fn new(
        pool: PgPool,
        source: Arc<dyn BaseJobSource>,
        engine: Arc<ReindexEngine<JobStore>>,
    ) -> Self {
        Self {
            pool,
            source,
            engine,
        }
    }

    /// Fetch and upsert one group, then re-embed the rows upserted with the
    /// active status. Closed rows keep their stale vectors; they are excluded
    /// from search anyway.
    pub async fn sync_group(&self, job_group_id: &str) -> Result<SyncReport, SyncError> {
        let payload = self.source.fetch_by_group_id(job_group_id).await?;
        let rows = rows_from_payload(&payload)?;

        let jobs = Job::upsert_many(&rows, &self.pool).await?;
        tracing::info!(job_group_id, count = jobs.len(), "Synced jobs from upstream");

        let open_ids: Vec<i64> = jobs
            .iter()
            .filter(|j| j.status.as_deref() == Some(STATUS_OPEN))
            .map(|j| j.id)
            .collect();

        // Embedding refresh is best-effort: a provider outage must not fail
        // the sync that already persisted the rows.
        let embeddings_updated = match self.engine.reindex_ids(&open_ids).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(error = %e, job_group_id, "Post-sync embedding refresh failed");
                0
            }
        };

        Ok(SyncReport {
            jobs,
            embeddings_updated,
        })
    }
}

/// A list maps wholesale; a single object must carry the `job` sub-object to
/// count as an advertisement.
fn rows_from_payload(payload: &AdvertisementPayload) -> Result<Vec<NewJob>, SyncError> {
    match payload {
        AdvertisementPayload::Many(ads) => Ok(mapper::map_advertisements(ads)),
        AdvertisementPayload::One(ad) if ad.job.is_some() => {
            Ok(vec![mapper::map_advertisement(ad)])
        }
        AdvertisementPayload::One(_) => Err(SyncError::InvalidPayload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(body: &str) -> AdvertisementPayload {
        serde_json::from_str(body).expect("payload should deserialize")
    }

    #[test]
    fn list_payload_maps_every_advertisement() {
        let payload = payload(
            r#"[
                {"title": "A", "job": {"job_post_id": 1, "status": "Open"}},
                {"title": "B", "job": {"job_post_id": 2, "status": "Close"}}
            ]"#,
        );

        let rows = rows_from_payload(&payload).expect("list payload is valid");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_post_id, Some(1));
        assert_eq!(rows[1].status.as_deref(), Some("Close"));
    }

    #[test]
    fn single_payload_maps_to_one_row() {
        let payload = payload(r#"{"title": "A", "job": {"job_post_id": 7, "status": "Open"}}"#);

        let rows = rows_from_payload(&payload).expect("single payload is valid");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_post_id, Some(7));
    }

    #[test]
    fn object_without_job_is_rejected() {
        let payload = payload(r#"{"error": "no such group"}"#);

        let err = rows_from_payload(&payload).expect_err("bare object is invalid");
        assert!(matches!(err, SyncError::InvalidPayload));
        assert_eq!(err.to_string(), "Invalid API response format");
    }

    #[test]
    fn empty_list_payload_is_valid_and_empty() {
        let rows = rows_from_payload(&payload("[]")).expect("empty list is valid");
        assert!(rows.is_empty());
    }
}
