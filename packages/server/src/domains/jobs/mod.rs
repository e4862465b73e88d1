// Jobs domain - syncs advertisements from the JobsGlobal feed
//
// Responsibilities:
// - Fetching advertisements per job group (via jobsglobal-client)
// - Mapping raw advertisements to job rows (industry/destination lookups)
// - Upserting rows keyed on job_post_id
// - Maintaining embeddings through the generic reindex engine
// - Group listing and summary stats for the dashboard

pub mod mapper;
pub mod models;
pub mod store;
pub mod sync;

pub use models::*;
pub use store::JobStore;
pub use sync::{JobSyncService, SyncError, SyncReport};
