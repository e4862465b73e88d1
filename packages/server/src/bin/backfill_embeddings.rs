//! Backfill embeddings for job and event rows.
//!
//! Incremental by default: only rows without an embedding are touched.
//! `--force` re-embeds everything instead.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::config::Config;
use server_core::domains::events::EventStore;
use server_core::domains::jobs::JobStore;
use server_core::kernel::reindex::RecordStore;
use server_core::kernel::{
    BaseEmbeddingService, EmbeddingService, ReindexEngine, ReindexSummary,
    DEFAULT_BACKFILL_BATCH_SIZE,
};

#[derive(Parser)]
#[command(name = "backfill_embeddings")]
#[command(about = "Backfill embeddings for job and event rows")]
struct Cli {
    /// Rows per page
    #[arg(long, default_value_t = DEFAULT_BACKFILL_BATCH_SIZE)]
    batch_size: i64,

    /// Re-embed every row instead of only rows missing an embedding
    #[arg(long)]
    force: bool,

    /// Only process the job table
    #[arg(long, conflicts_with = "events_only")]
    jobs_only: bool,

    /// Only process the event table
    #[arg(long)]
    events_only: bool,
}

async fn run_backfill<S: RecordStore>(
    engine: &ReindexEngine<S>,
    force: bool,
    batch_size: i64,
) -> Result<ReindexSummary> {
    if force {
        engine.reindex(None, batch_size).await
    } else {
        engine.backfill_missing(batch_size).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Per-record warnings from the engine are the only failure visibility
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,server_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mode = if cli.force {
        "force reindex (overwriting all embeddings)"
    } else {
        "incremental (only missing embeddings)"
    };
    println!("Starting backfill in {} mode with batch size {}", mode, cli.batch_size);

    let config = Config::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    println!("Connected to database");

    let embedder: Arc<dyn BaseEmbeddingService> = Arc::new(EmbeddingService::new(
        config.openai_api_key,
        config.embedding_model,
    ));

    if !cli.events_only {
        println!("\nBackfilling job embeddings...");
        let engine = ReindexEngine::new(JobStore::new(pool.clone()), embedder.clone());
        let summary = run_backfill(&engine, cli.force, cli.batch_size)
            .await
            .context("Job backfill failed")?;
        println!(
            "  Jobs: {}/{} embeddings updated",
            summary.total_processed, summary.total_records
        );
    }

    if !cli.jobs_only {
        println!("\nBackfilling event embeddings...");
        let engine = ReindexEngine::new(EventStore::new(pool.clone()), embedder.clone());
        let summary = run_backfill(&engine, cli.force, cli.batch_size)
            .await
            .context("Event backfill failed")?;
        println!(
            "  Events: {}/{} embeddings updated",
            summary.total_processed, summary.total_records
        );
    }

    println!("\nBackfill complete!");

    Ok(())
}
