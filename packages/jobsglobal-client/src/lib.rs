//! Pure JobsGlobal REST API client.
//!
//! A minimal client for the JobsGlobal advertisement API. Fetches the raw
//! advertisement payload for a job group; mapping the payload onto rows is
//! the caller's concern.
//!
//! # Example
//!
//! ```rust,ignore
//! use jobsglobal_client::JobsGlobalClient;
//!
//! let client = JobsGlobalClient::new(api_url, bearer_token);
//!
//! let payload = client.fetch_by_group_id("GRP-2207").await?;
//! println!("{} advertisement(s)", payload.len());
//! ```

pub mod error;
pub mod types;

pub use error::{JobsGlobalError, Result};
pub use types::{Advertisement, AdvertisementJob, AdvertisementPayload, AdvertisementRequest};

use std::time::Duration;

use reqwest::header::ACCEPT;

/// Default advertisement endpoint.
pub const DEFAULT_API_URL: &str =
    "https://jobsglobal.com/apil/applicants_extended/ws/getAdvertisementJson";

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct JobsGlobalClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl JobsGlobalClient {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            token,
        }
    }

    /// Fetch the raw advertisement payload for one job group.
    pub async fn fetch_by_group_id(&self, job_group_id: &str) -> Result<AdvertisementPayload> {
        tracing::debug!(job_group_id, "Fetching advertisements from JobsGlobal");

        let request = AdvertisementRequest {
            job_group_id: job_group_id.to_string(),
        };

        let resp = self
            .client
            .post(&self.api_url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(JobsGlobalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let payload: AdvertisementPayload = serde_json::from_str(&body)?;

        tracing::debug!(job_group_id, count = payload.len(), "Fetched advertisements");
        Ok(payload)
    }
}
