/// Route table and shared state for the HTTP server
use actix_cors::Cors;
use actix_web::{http::header, web};

use crate::config::{CorsConfig, UploadConfig};
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::middleware::JwtAuthMiddleware;
use crate::services::{IngestionPipeline, ProximitySearch};

/// Everything a worker needs to serve requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub search: ProximitySearch,
    pub upload: UploadConfig,
    pub jwt_secret: String,
}

/// Registers routes. `/post` and `/search` require a bearer token;
/// `/health` and `/metrics` are public.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.pipeline.clone()))
        .app_data(web::Data::new(state.search.clone()))
        .app_data(web::Data::new(state.upload.clone()))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::resource("/post")
                .wrap(JwtAuthMiddleware::new(&state.jwt_secret))
                .route(web::post().to(handlers::create_post)),
        )
        .service(
            web::resource("/search")
                .wrap(JwtAuthMiddleware::new(&state.jwt_secret))
                .route(web::get().to(handlers::search_posts)),
        );
}

/// Browser clients on any origin may call the API with a bearer token.
pub fn cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
