use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::config::UploadConfig;
use crate::error::Result;
use crate::models::{CallerIdentity, CreatePostResponse};
use crate::multipart::read_post_form;
use crate::services::IngestionPipeline;

/// POST /post
///
/// Multipart fields: `message`, `lat`, `lon` and the `image` part.
pub async fn create_post(
    identity: CallerIdentity,
    pipeline: web::Data<IngestionPipeline>,
    upload: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let (form, media) = read_post_form(payload, upload.memory_threshold_bytes).await?;
    let id = pipeline.ingest(&identity, form, media).await?;

    Ok(HttpResponse::Created().json(CreatePostResponse { id }))
}
