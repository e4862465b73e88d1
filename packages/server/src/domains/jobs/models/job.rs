use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::kernel::reindex::EmbedRecord;

/// Status values the upstream feed uses.
pub const STATUS_OPEN: &str = "Open";
pub const STATUS_CLOSE: &str = "Close";

/// Job - one advertisement row synced from the upstream feed
///
/// The table also carries an `embedding` vector column; it is written through
/// targeted updates only and never read back into this struct.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub job_group_id: Option<String>,
    pub job_post_id: Option<i64>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub apply_link: Option<String>,
    pub image_link: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub job_description: Option<String>,
    pub status: Option<String>,
    pub date_created: Option<NaiveDate>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape produced by the upstream mapper, ready to upsert.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_group_id: Option<String>,
    pub job_post_id: Option<i64>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub apply_link: Option<String>,
    pub image_link: String,
    pub category: Option<String>,
    pub country: Option<String>,
    pub job_description: Option<String>,
    pub status: Option<String>,
    pub date_created: Option<NaiveDate>,
    pub metadata: JsonValue,
}

/// One row per job group, aggregated for the listing view.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobGroupSummary {
    pub job_group_id: Option<String>,
    pub status: Option<String>,
    pub date_created: Option<NaiveDate>,
    pub job_count: i64,
}

/// Query parameters for the group listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobGroupFilter {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Corpus-wide counters for the dashboard header.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SummaryStats {
    pub total_open_trips: i64,
    pub total_open_jobs: i64,
    pub total_trips: i64,
    pub total_jobs: i64,
}

impl EmbedRecord for Job {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn has_embeddable_text(&self) -> bool {
        let title_empty = self.job_title.as_deref().map_or(true, str::is_empty);
        let description_empty = self.job_description.as_deref().map_or(true, str::is_empty);
        !(title_empty && description_empty)
    }

    fn embedding_text(&self) -> String {
        format!(
            "Title: {}. Description: {}. Status: {}. Country: {}. Category: {}",
            self.job_title.as_deref().unwrap_or(""),
            self.job_description.as_deref().unwrap_or(""),
            self.status.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or(""),
            self.category.as_deref().unwrap_or(""),
        )
    }
}

/// ORDER BY fragment for the group listing. Only whitelisted values reach the
/// query; anything else falls back to the date default.
fn group_order_clause(sort_by: Option<&str>, sort_order: Option<&str>) -> &'static str {
    let descending = !matches!(sort_order, Some("asc"));
    match (sort_by, descending) {
        (Some("status"), true) => "status DESC NULLS LAST",
        (Some("status"), false) => "status ASC NULLS FIRST",
        (_, true) => "date_created DESC NULLS LAST",
        (_, false) => "date_created ASC NULLS FIRST",
    }
}

/// Status filter for the group listing. Only the two known feed values reach
/// the query; anything else means no filter.
fn status_filter(status: Option<&str>) -> Option<&str> {
    status.filter(|s| [STATUS_OPEN, STATUS_CLOSE].contains(s))
}

/// ILIKE pattern for the group search. Blank input means no filter.
fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s))
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Job {
    /// Upsert one row, keyed on the upstream job_post_id.
    pub async fn upsert(new: &NewJob, pool: &PgPool) -> Result<Self> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO job_list (
                job_group_id, job_post_id, job_title, email, apply_link, image_link,
                category, country, job_description, status, date_created, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (job_post_id) DO UPDATE
            SET job_group_id = EXCLUDED.job_group_id,
                job_title = EXCLUDED.job_title,
                email = EXCLUDED.email,
                apply_link = EXCLUDED.apply_link,
                image_link = EXCLUDED.image_link,
                category = EXCLUDED.category,
                country = EXCLUDED.country,
                job_description = EXCLUDED.job_description,
                status = EXCLUDED.status,
                date_created = EXCLUDED.date_created,
                metadata = EXCLUDED.metadata,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&new.job_group_id)
        .bind(new.job_post_id)
        .bind(&new.job_title)
        .bind(&new.email)
        .bind(&new.apply_link)
        .bind(&new.image_link)
        .bind(&new.category)
        .bind(&new.country)
        .bind(&new.job_description)
        .bind(&new.status)
        .bind(new.date_created)
        .bind(&new.metadata)
        .fetch_one(pool)
        .await?;
        Ok(job)
    }

    /// Upsert a batch in order, returning the stored rows.
    pub async fn upsert_many(rows: &[NewJob], pool: &PgPool) -> Result<Vec<Self>> {
        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            jobs.push(Self::upsert(row, pool).await?);
        }
        Ok(jobs)
    }

    /// All jobs in a group, newest first (modal display).
    pub async fn find_by_group_id(job_group_id: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM job_list WHERE job_group_id = $1 ORDER BY date_created DESC",
        )
        .bind(job_group_id)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Exactly the given rows, for targeted re-embedding.
    pub async fn find_by_ids(ids: &[i64], pool: &PgPool) -> Result<Vec<Self>> {
        let jobs = sqlx::query_as::<_, Job>("SELECT * FROM job_list WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(jobs)
    }

    /// Count rows matching a reindex filter.
    pub async fn count_in_scope(
        scope: Option<&str>,
        only_missing: bool,
        pool: &PgPool,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM job_list
            WHERE ($1::text IS NULL OR job_group_id = $1)
              AND (NOT $2 OR embedding IS NULL)
            "#,
        )
        .bind(scope)
        .bind(only_missing)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One reindex page in stable id order.
    pub async fn fetch_page(
        scope: Option<&str>,
        only_missing: bool,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM job_list
            WHERE ($1::text IS NULL OR job_group_id = $1)
              AND (NOT $2 OR embedding IS NULL)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(scope)
        .bind(only_missing)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Write one embedding vector. Targeted single-column update.
    pub async fn update_embedding(id: i64, embedding: &[f32], pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE job_list SET embedding = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(pgvector::Vector::from(embedding.to_vec()))
            .execute(pool)
            .await?;
        Ok(())
    }
}

impl JobGroupSummary {
    /// Aggregate the job list into one row per group: the status of the
    /// newest row, the newest date, and the row count. Status filter accepts
    /// only the known values and is otherwise ignored; search is a
    /// case-insensitive substring match on the group id.
    pub async fn list(filter: &JobGroupFilter, pool: &PgPool) -> Result<Vec<Self>> {
        let status = status_filter(filter.status.as_deref());
        let search = search_pattern(filter.search.as_deref());

        let query = format!(
            r#"
            SELECT
                job_group_id,
                (ARRAY_AGG(status ORDER BY date_created DESC NULLS LAST))[1] AS status,
                MAX(date_created) AS date_created,
                COUNT(*) AS job_count
            FROM job_list
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR job_group_id ILIKE $2)
            GROUP BY job_group_id
            ORDER BY {}
            "#,
            group_order_clause(filter.sort_by.as_deref(), filter.sort_order.as_deref())
        );

        let groups = sqlx::query_as::<_, JobGroupSummary>(&query)
            .bind(status)
            .bind(search)
            .fetch_all(pool)
            .await?;
        Ok(groups)
    }
}

impl SummaryStats {
    /// Dashboard counters in one aggregate pass. Rows without a group id are
    /// not counted as trips.
    pub async fn fetch(pool: &PgPool) -> Result<Self> {
        let stats = sqlx::query_as::<_, SummaryStats>(
            r#"
            SELECT
                COUNT(DISTINCT job_group_id) FILTER (WHERE status = $1) AS total_open_trips,
                COUNT(*) FILTER (WHERE status = $1) AS total_open_jobs,
                COUNT(DISTINCT job_group_id) AS total_trips,
                COUNT(*) AS total_jobs
            FROM job_list
            "#,
        )
        .bind(STATUS_OPEN)
        .fetch_one(pool)
        .await?;
        Ok(stats)
    }
}
