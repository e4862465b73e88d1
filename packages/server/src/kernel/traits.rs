// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like composing embedding text) lives with the record models.
//
// Naming convention: Base* for trait names (e.g., BaseEmbeddingService)

use async_trait::async_trait;
use jobsglobal_client::{AdvertisementPayload, JobsGlobalClient, JobsGlobalError};

use crate::kernel::embeddings::EmbeddingError;

// =============================================================================
// Embedding Service Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseEmbeddingService: Send + Sync {
    /// Generate embedding for text (returns 1536-dimensional vector)
    async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// =============================================================================
// Upstream Job Source Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseJobSource: Send + Sync {
    /// Fetch the raw advertisement payload for one job group
    async fn fetch_by_group_id(
        &self,
        job_group_id: &str,
    ) -> Result<AdvertisementPayload, JobsGlobalError>;
}

#[async_trait]
impl BaseJobSource for JobsGlobalClient {
    async fn fetch_by_group_id(
        &self,
        job_group_id: &str,
    ) -> Result<AdvertisementPayload, JobsGlobalError> {
        JobsGlobalClient::fetch_by_group_id(self, job_group_id).await
    }
}
