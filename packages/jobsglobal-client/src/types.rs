use serde::{Deserialize, Serialize};

/// Request body for the advertisement endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AdvertisementRequest {
    pub job_group_id: String,
}

/// Response payload for a group lookup. The API returns a bare list when the
/// group carries several postings and a single object when it carries one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdvertisementPayload {
    Many(Vec<Advertisement>),
    One(Advertisement),
}

impl AdvertisementPayload {
    /// Number of advertisements in the payload.
    pub fn len(&self) -> usize {
        match self {
            Self::Many(ads) => ads.len(),
            Self::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single advertisement as returned by the API. The contact fields live at
/// the top level; the posting details sit in the nested `job` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Advertisement {
    pub title: Option<String>,
    pub email: Option<String>,
    pub link: Option<String>,
    pub job: Option<AdvertisementJob>,
}

/// Posting details nested inside an advertisement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvertisementJob {
    pub job_group_id: Option<String>,
    pub job_post_id: Option<i64>,
    pub cover_photo: Option<String>,
    /// JSON-array string of industry ids, e.g. `"[688, 123]"`.
    pub industry_ids: Option<String>,
    /// JSON-array string of destination ids.
    pub job_destinations: Option<String>,
    pub job_description: Option<String>,
    pub status: Option<String>,
    /// Datetime string in `YYYY-MM-DD HH:MM:SS` form.
    pub date_created: Option<String>,
}
