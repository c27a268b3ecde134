//! Orphan sweep - deletes blobs that never made it into the index
//!
//! A post whose index write failed leaves its media object behind in the
//! bucket. This tool lists the bucket, skips objects younger than the grace
//! period, and removes objects whose id has no index document.
//!
//! Usage: sweep-orphans [--dry-run]
//!
//! Environment variables reused from around-service:
//! ELASTICSEARCH_URL, ELASTICSEARCH_POST_INDEX, S3_BUCKET, AWS_REGION,
//! S3_ENDPOINT (optional), SWEEP_GRACE_SECS (default: 3600).
use anyhow::Context;
use around_service::services::{ElasticsearchIndex, OrphanSweeper, S3BlobStore};
use around_service::Config;
use s3_utils::S3Client;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "around_service=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");
    let config = Config::from_env().context("Failed to load configuration")?;

    let index = Arc::new(
        ElasticsearchIndex::new(&config.search.elasticsearch_url, &config.search.post_index)
            .context("Failed to build Elasticsearch client")?,
    );
    let blob_store = Arc::new(S3BlobStore::new(
        S3Client::with_config(config.s3.clone()).await,
    ));

    let sweeper = OrphanSweeper::new(
        blob_store,
        index,
        chrono::Duration::seconds(config.sweep.grace_secs),
    );

    tracing::info!(
        bucket = %config.s3.bucket,
        grace_secs = config.sweep.grace_secs,
        dry_run,
        "starting orphan sweep"
    );

    let report = sweeper
        .sweep(chrono::Utc::now(), dry_run)
        .await
        .context("Orphan sweep failed")?;

    tracing::info!(
        scanned = report.scanned,
        skipped_recent = report.skipped_recent,
        skipped_foreign = report.skipped_foreign,
        kept = report.kept,
        orphaned = report.orphaned.len(),
        delete_failures = report.delete_failures,
        "orphan sweep finished"
    );

    if report.delete_failures > 0 {
        anyhow::bail!("{} orphaned blobs could not be deleted", report.delete_failures);
    }
    Ok(())
}
