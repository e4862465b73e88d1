use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::kernel::reindex::EmbedRecord;

/// Event - one recruiting event row
///
/// Like the job table, `event_list` carries an `embedding` vector column that
/// is written through targeted updates only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub industry: Option<String>,
    pub job_location: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmbedRecord for Event {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn has_embeddable_text(&self) -> bool {
        let title_empty = self.title.as_deref().map_or(true, str::is_empty);
        let description_empty = self.description.as_deref().map_or(true, str::is_empty);
        !(title_empty && description_empty)
    }

    fn embedding_text(&self) -> String {
        let event_date = self.event_date.map(|d| d.to_string()).unwrap_or_default();
        format!(
            "Title: {}. Description: {}. Event Date: {}. Industry: {}. Location: {}. Status: {}",
            self.title.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            event_date,
            self.industry.as_deref().unwrap_or(""),
            self.job_location.as_deref().unwrap_or(""),
            self.status.as_deref().unwrap_or(""),
        )
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Event {
    pub async fn count(only_missing: bool, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_list WHERE (NOT $1 OR embedding IS NULL)",
        )
        .bind(only_missing)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One reindex page in stable id order.
    pub async fn fetch_page(
        only_missing: bool,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM event_list
            WHERE (NOT $1 OR embedding IS NULL)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(only_missing)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn find_by_ids(ids: &[i64], pool: &PgPool) -> Result<Vec<Self>> {
        let events =
            sqlx::query_as::<_, Event>("SELECT * FROM event_list WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(events)
    }

    /// Write one embedding vector. Targeted single-column update.
    pub async fn update_embedding(id: i64, embedding: &[f32], pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE event_list SET embedding = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(pgvector::Vector::from(embedding.to_vec()))
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event {
            id: 3,
            title: Some("Walk-in interviews".to_string()),
            description: Some("Hiring drive for hotel staff".to_string()),
            event_date: NaiveDate::from_ymd_opt(2025, 12, 2),
            industry: Some("Hospitality & Catering".to_string()),
            job_location: Some("Riyadh".to_string()),
            status: Some("Open".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn embedding_text_follows_the_event_template() {
        assert_eq!(
            event().embedding_text(),
            "Title: Walk-in interviews. Description: Hiring drive for hotel staff. Event Date: 2025-12-02. Industry: Hospitality & Catering. Location: Riyadh. Status: Open"
        );
    }

    #[test]
    fn missing_event_fields_render_as_empty() {
        let mut event = event();
        event.event_date = None;
        event.industry = None;
        event.job_location = None;
        event.status = None;
        assert_eq!(
            event.embedding_text(),
            "Title: Walk-in interviews. Description: Hiring drive for hotel staff. Event Date: . Industry: . Location: . Status: "
        );
    }

    #[test]
    fn title_or_description_required_for_embedding() {
        let mut event = event();
        event.title = None;
        assert!(event.has_embeddable_text());

        event.description = Some("".to_string());
        assert!(!event.has_embeddable_text());
    }
}
