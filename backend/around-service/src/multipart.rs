/// Multipart decoding for ingestion requests.
use actix_multipart::{Field, Multipart};
use futures::StreamExt;

use crate::error::{AppError, Result};
use crate::media::{MediaBuffer, MediaUpload};
use crate::models::{parse_coordinate, PostForm};

pub const MEDIA_FIELD: &str = "image";
/// Text fields share a budget of the memory threshold plus this allowance.
pub const TEXT_VALUE_ALLOWANCE_BYTES: usize = 10 << 20;

/// Reads `message`, `lat`, `lon` and the `image` part from the request.
///
/// Unknown parts are drained and ignored. A missing `image` part is not an
/// error here; the pipeline decides how to answer it. All text fields
/// together may use `memory_threshold + TEXT_VALUE_ALLOWANCE_BYTES` bytes.
pub async fn read_post_form(
    mut payload: Multipart,
    memory_threshold: usize,
) -> Result<(PostForm, Option<MediaUpload>)> {
    let mut form = PostForm::default();
    let mut media = None;
    let mut text_budget = memory_threshold.saturating_add(TEXT_VALUE_ALLOWANCE_BYTES);

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => form.message = read_text(&mut field, &name, &mut text_budget).await?,
            "lat" => {
                form.lat = parse_coordinate(&read_text(&mut field, &name, &mut text_budget).await?)
            }
            "lon" => {
                form.lon = parse_coordinate(&read_text(&mut field, &name, &mut text_budget).await?)
            }
            MEDIA_FIELD if media.is_none() => {
                media = Some(read_media(&mut field, memory_threshold).await?);
            }
            _ => drain(&mut field).await?,
        }
    }

    Ok((form, media))
}

async fn read_text(field: &mut Field, name: &str, budget: &mut usize) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::BadRequest(format!("{} read error: {}", name, e)))?;
        *budget = budget.checked_sub(data.len()).ok_or_else(|| {
            AppError::BadRequest(format!("{} exceeds the form size limit", name))
        })?;
        buf.extend_from_slice(&data);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn read_media(field: &mut Field, memory_threshold: usize) -> Result<MediaUpload> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut buffer = MediaBuffer::new(memory_threshold);
    while let Some(chunk) = field.next().await {
        let data =
            chunk.map_err(|e| AppError::BadRequest(format!("Image read error: {}", e)))?;
        buffer.write(&data).await?;
    }

    Ok(MediaUpload {
        filename,
        content_type,
        body: buffer.finish().await?,
    })
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
    }
    Ok(())
}
