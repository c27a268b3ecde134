use async_trait::async_trait;
use s3_utils::{ByteStream, S3Client, S3Error, StoredObject};
use thiserror::Error;

use crate::media::{MediaBody, MediaUpload};

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error(transparent)]
    S3(#[from] S3Error),
    #[error("failed to open media body: {0}")]
    Body(String),
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Durable object storage with public-read URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `media` under `key`, make it publicly readable and return its
    /// canonical URL. Only returns `Ok` once the object is readable.
    async fn put_public(&self, key: &str, media: &MediaUpload) -> Result<String, BlobStoreError>;

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobStoreError>;
}

#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
}

impl S3BlobStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_public(&self, key: &str, media: &MediaUpload) -> Result<String, BlobStoreError> {
        // Objects may only be written into a pre-existing bucket.
        self.client.ensure_bucket().await?;

        let body = match &media.body {
            MediaBody::Memory(bytes) => ByteStream::from(bytes.clone()),
            MediaBody::Spilled { path, .. } => ByteStream::from_path(&**path)
                .await
                .map_err(|e| BlobStoreError::Body(e.to_string()))?,
        };

        self.client
            .put_object(key, body, media.content_type.as_deref())
            .await?;
        self.client.set_public_read(key).await?;

        let meta = self.client.head_object(key).await?;
        let url = self.client.config().object_url(key);

        tracing::info!(
            key,
            size = meta.size,
            content_type = meta.content_type.as_deref().unwrap_or("unknown"),
            etag = meta.etag.as_deref().unwrap_or_default(),
            url = %url,
            "media saved to bucket"
        );
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.client.delete_object(key).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobStoreError> {
        Ok(self.client.list_objects(prefix).await?)
    }
}
