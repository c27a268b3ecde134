/// Around Service - HTTP Server
///
/// Accepts geo-tagged posts with an image and answers proximity searches.
use actix_web::{middleware as actix_middleware, App, HttpServer};
use anyhow::Context;
use around_service::app::{self, AppState};
use around_service::middleware::MetricsMiddleware;
use around_service::moderation::ContentFilter;
use around_service::services::document_index::ensure_post_index;
use around_service::services::{
    DocumentIndex, ElasticsearchIndex, IngestionPipeline, ProximitySearch, S3BlobStore,
};
use around_service::Config;
use s3_utils::S3Client;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    // JSON lines in production, human-readable output elsewhere
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "around_service=info,actix_web=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let index = Arc::new(
        ElasticsearchIndex::new(&config.search.elasticsearch_url, &config.search.post_index)
            .context("Failed to build Elasticsearch client")?,
    );
    match ensure_post_index(index.as_ref()).await {
        Ok(true) => tracing::info!(index = index.post_index(), "created post index"),
        Ok(false) => tracing::info!(index = index.post_index(), "post index exists"),
        Err(e) => return Err(e).context("Failed to prepare post index"),
    }
    let index: Arc<dyn DocumentIndex> = index;

    let s3 = S3Client::with_config(config.s3.clone()).await;
    let blob_store = Arc::new(S3BlobStore::new(s3));

    let filter = ContentFilter::new(config.moderation.blocklist.iter());
    tracing::info!(terms = filter.terms().len(), "content filter loaded");

    let search = ProximitySearch::new(
        index.clone(),
        filter,
        config.search.default_radius_km,
        config.search.max_results,
    );
    tracing::info!(
        default_radius = %search.default_radius(),
        max_results = config.search.max_results,
        "proximity search ready"
    );

    let state = AppState {
        pipeline: IngestionPipeline::new(blob_store, index),
        search,
        upload: config.upload.clone(),
        jwt_secret: config.auth.jwt_secret.clone(),
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(
        env = %config.app.env,
        "around-service starting HTTP server on {}",
        bind_address
    );

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(app::cors(&cors_config))
            .wrap(MetricsMiddleware)
            .wrap(actix_middleware::Logger::default())
            .configure(|cfg| app::configure(cfg, &state))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    tracing::info!("around-service shutting down");
    Ok(())
}
