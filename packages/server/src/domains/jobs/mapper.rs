//! Upstream advertisement -> job row mapping.
//!
//! Pure functions, no I/O. Industry and destination ids arrive as JSON-array
//! strings ("[688, 123]") and are resolved against lookup tables embedded at
//! compile time.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use serde_json::{json, Value};

use jobsglobal_client::Advertisement;

use super::models::NewJob;

/// Fallback cover image when the advertisement has none.
pub const DEFAULT_IMAGE: &str = "https://jobsglobal.com/lv/i/ap1.png";

lazy_static! {
    static ref INDUSTRIES: HashMap<String, String> =
        load_lookup(include_str!("data/industries.json"));
    static ref DESTINATIONS: HashMap<String, String> =
        load_lookup(include_str!("data/destinations.json"));
}

fn load_lookup(raw: &str) -> HashMap<String, String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Parse an id-array string like "[688, 123]" into string ids. Null, empty,
/// or malformed input yields an empty list.
pub fn parse_ids_string(ids: Option<&str>) -> Vec<String> {
    let Some(raw) = ids else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Industry ids to category names, joined when the ad spans several.
pub fn category_from_ids(industry_ids: Option<&str>) -> Option<String> {
    let ids = parse_ids_string(industry_ids);
    let categories: Vec<&str> = ids
        .iter()
        .filter_map(|id| INDUSTRIES.get(id).map(String::as_str))
        .collect();
    if categories.is_empty() {
        None
    } else {
        Some(categories.join(", "))
    }
}

/// Destination ids to a country name, first known id wins.
pub fn country_from_ids(destination_ids: Option<&str>) -> Option<String> {
    parse_ids_string(destination_ids)
        .iter()
        .find_map(|id| DESTINATIONS.get(id).cloned())
}

/// Parse the feed's "2025-11-25 23:10:29" datetime strings down to a date.
pub fn parse_date(date: Option<&str>) -> Option<NaiveDate> {
    let raw = date?;
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Map one advertisement to a row. The `metadata` JSON mirrors the display
/// fields for the frontend, so the modal renders without a second query.
pub fn map_advertisement(ad: &Advertisement) -> NewJob {
    let job = ad.job.clone().unwrap_or_default();

    let image_link = job
        .cover_photo
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());
    let category = category_from_ids(job.industry_ids.as_deref());
    let country = country_from_ids(job.job_destinations.as_deref());
    let date_created = parse_date(job.date_created.as_deref());

    let metadata = json!({
        "email": ad.email,
        "status": job.status,
        "country": country,
        "category": category,
        "imageUrl": image_link,
        "applyLink": ad.link,
        "job_title": ad.title,
    });

    NewJob {
        job_group_id: job.job_group_id,
        job_post_id: job.job_post_id,
        job_title: ad.title.clone(),
        email: ad.email.clone(),
        apply_link: ad.link.clone(),
        image_link,
        category,
        country,
        job_description: job.job_description,
        status: job.status,
        date_created,
        metadata,
    }
}

/// Map a list payload in order.
pub fn map_advertisements(ads: &[Advertisement]) -> Vec<NewJob> {
    ads.iter().map(map_advertisement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsglobal_client::AdvertisementJob;

    #[test]
    fn id_strings_parse_to_string_ids() {
        assert_eq!(parse_ids_string(Some("[688, 123]")), vec!["688", "123"]);
        assert_eq!(parse_ids_string(Some(r#"["688"]"#)), vec!["688"]);
        assert_eq!(parse_ids_string(Some("[]")), Vec::<String>::new());
    }

    #[test]
    fn bad_id_strings_parse_to_nothing() {
        assert_eq!(parse_ids_string(None), Vec::<String>::new());
        assert_eq!(parse_ids_string(Some("")), Vec::<String>::new());
        assert_eq!(parse_ids_string(Some("not json")), Vec::<String>::new());
        assert_eq!(parse_ids_string(Some("42")), Vec::<String>::new());
    }

    #[test]
    fn industry_ids_resolve_and_join() {
        assert_eq!(
            category_from_ids(Some("[688]")),
            Some("Hospitality & Catering".to_string())
        );
        assert_eq!(
            category_from_ids(Some("[688, 621]")),
            Some("Hospitality & Catering, Welding & Metal Works".to_string())
        );
        assert_eq!(category_from_ids(Some("[999999]")), None);
        assert_eq!(category_from_ids(None), None);
    }

    #[test]
    fn first_known_destination_wins() {
        assert_eq!(
            country_from_ids(Some("[184, 107]")),
            Some("Saudi Arabia".to_string())
        );
        assert_eq!(
            country_from_ids(Some("[999999, 107]")),
            Some("United Arab Emirates".to_string())
        );
        assert_eq!(country_from_ids(Some("[999999]")), None);
    }

    #[test]
    fn feed_datetimes_parse_to_dates() {
        assert_eq!(
            parse_date(Some("2025-11-25 23:10:29")),
            NaiveDate::from_ymd_opt(2025, 11, 25)
        );
        assert_eq!(parse_date(Some("2025-11-25")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn advertisement_maps_to_row() {
        let ad = Advertisement {
            title: Some("Waiter".to_string()),
            email: Some("apply@example.com".to_string()),
            link: Some("https://example.com/apply/42".to_string()),
            job: Some(AdvertisementJob {
                job_group_id: Some("OJ07505".to_string()),
                job_post_id: Some(93731),
                cover_photo: Some("https://example.com/p.png".to_string()),
                industry_ids: Some("[688]".to_string()),
                job_destinations: Some("[184]".to_string()),
                job_description: Some("Serve guests".to_string()),
                status: Some("Open".to_string()),
                date_created: Some("2025-11-25 23:10:29".to_string()),
            }),
        };

        let row = map_advertisement(&ad);
        assert_eq!(row.job_group_id.as_deref(), Some("OJ07505"));
        assert_eq!(row.job_post_id, Some(93731));
        assert_eq!(row.job_title.as_deref(), Some("Waiter"));
        assert_eq!(row.category.as_deref(), Some("Hospitality & Catering"));
        assert_eq!(row.country.as_deref(), Some("Saudi Arabia"));
        assert_eq!(row.image_link, "https://example.com/p.png");
        assert_eq!(row.date_created, NaiveDate::from_ymd_opt(2025, 11, 25));
        assert_eq!(row.metadata["applyLink"], "https://example.com/apply/42");
        assert_eq!(row.metadata["job_title"], "Waiter");
    }

    #[test]
    fn missing_cover_photo_falls_back_to_default() {
        let ad = Advertisement {
            title: Some("Waiter".to_string()),
            job: Some(AdvertisementJob {
                cover_photo: Some("".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(map_advertisement(&ad).image_link, DEFAULT_IMAGE);

        let bare = Advertisement::default();
        assert_eq!(map_advertisement(&bare).image_link, DEFAULT_IMAGE);
    }
}
