use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::media::MediaUpload;
use crate::metrics::{INGEST_FAILURES_TOTAL, POSTS_INGESTED_TOTAL};
use crate::models::{CallerIdentity, Location, Post, PostForm, PostId};
use crate::services::blob_store::BlobStore;
use crate::services::document_index::DocumentIndex;

/// Creates posts: media goes to the blob store first, the document is
/// indexed second, both under the same generated id.
///
/// The ordering guarantees search never returns a post whose media URL is
/// missing or private. The reverse gap, a blob whose index write failed,
/// is left for the orphan sweep.
#[derive(Clone)]
pub struct IngestionPipeline {
    blob_store: Arc<dyn BlobStore>,
    index: Arc<dyn DocumentIndex>,
}

impl IngestionPipeline {
    pub fn new(blob_store: Arc<dyn BlobStore>, index: Arc<dyn DocumentIndex>) -> Self {
        Self { blob_store, index }
    }

    pub async fn ingest(
        &self,
        identity: &CallerIdentity,
        form: PostForm,
        media: Option<MediaUpload>,
    ) -> Result<PostId> {
        let media = media.ok_or_else(|| {
            INGEST_FAILURES_TOTAL.with_label_values(&["media"]).inc();
            tracing::warn!(user = identity.username(), "post rejected: image is not available");
            AppError::MediaNotAvailable("request has no image part".to_string())
        })?;

        let id = PostId::generate();
        let key = id.to_string();

        tracing::info!(
            post_id = %id,
            user = identity.username(),
            lat = form.lat,
            lon = form.lon,
            filename = media.filename.as_deref().unwrap_or_default(),
            media_bytes = media.len(),
            spilled = media.is_spilled(),
            "received post"
        );

        let url = self.blob_store.put_public(&key, &media).await.map_err(|e| {
            INGEST_FAILURES_TOTAL.with_label_values(&["blob"]).inc();
            tracing::error!(post_id = %id, "failed to save media: {}", e);
            AppError::from(e)
        })?;

        let post = Post {
            user: identity.username().to_string(),
            message: form.message,
            location: Location::new(form.lat, form.lon),
            url: Some(url),
        };

        self.index.put_post(id, &post).await.map_err(|e| {
            INGEST_FAILURES_TOTAL.with_label_values(&["index"]).inc();
            tracing::warn!(
                post_id = %id,
                orphaned_blob = %key,
                "failed to index post, blob left orphaned: {}",
                e
            );
            AppError::from(e)
        })?;

        POSTS_INGESTED_TOTAL.inc();
        tracing::info!(post_id = %id, "post saved to index");

        Ok(id)
    }
}
