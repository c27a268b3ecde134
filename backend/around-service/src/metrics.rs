/// Prometheus metrics for around-service
use actix_web::HttpResponse;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static::lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "around_http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    ).expect("register around_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "around_http_request_duration_seconds",
        "HTTP request latency",
        &["method", "path"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).expect("register around_http_request_duration_seconds");

    pub static ref POSTS_INGESTED_TOTAL: IntCounter = register_int_counter!(
        "around_posts_ingested_total",
        "Posts written to both the blob store and the index"
    ).expect("register around_posts_ingested_total");

    /// stage: media | blob | index
    pub static ref INGEST_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "around_ingest_failures_total",
        "Ingestion failures by pipeline stage",
        &["stage"]
    ).expect("register around_ingest_failures_total");

    pub static ref SEARCH_REQUESTS_TOTAL: IntCounter = register_int_counter!(
        "around_search_requests_total",
        "Proximity searches served"
    ).expect("register around_search_requests_total");

    pub static ref POSTS_FILTERED_TOTAL: IntCounter = register_int_counter!(
        "around_posts_filtered_total",
        "Search hits dropped by the content filter"
    ).expect("register around_posts_filtered_total");
}

/// GET /metrics
pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
