/// S3 object operations used by the media upload path and maintenance jobs
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::{DateTime, Utc};

use crate::{S3Client, S3Error};

/// Metadata of a single stored object.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Listing entry.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl S3Client {
    /// Fail unless the configured bucket exists and is reachable.
    pub async fn ensure_bucket(&self) -> Result<(), S3Error> {
        self.client()
            .head_bucket()
            .bucket(&self.config().bucket)
            .send()
            .await
            .map_err(|e| S3Error::Bucket {
                bucket: self.config().bucket.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    /// Write an object. Objects are private until [`S3Client::set_public_read`].
    pub async fn put_object(
        &self,
        key: &str,
        body: ByteStream,
        content_type: Option<&str>,
    ) -> Result<(), S3Error> {
        self.client()
            .put_object()
            .bucket(&self.config().bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(body)
            .send()
            .await
            .map_err(|e| S3Error::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    /// Grant anonymous read access to an existing object.
    pub async fn set_public_read(&self, key: &str) -> Result<(), S3Error> {
        self.client()
            .put_object_acl()
            .bucket(&self.config().bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| S3Error::Acl {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    pub async fn head_object(&self, key: &str) -> Result<ObjectMetadata, S3Error> {
        let response = self
            .client()
            .head_object()
            .bucket(&self.config().bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Head {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(ObjectMetadata {
            size: response.content_length().unwrap_or(0).max(0) as u64,
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), S3Error> {
        self.client()
            .delete_object()
            .bucket(&self.config().bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    /// List every object under `prefix`, following continuation tokens.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, S3Error> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self
                .client()
                .list_objects_v2()
                .bucket(&self.config().bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| S3Error::List(DisplayErrorContext(&e).to_string()))?;

            objects.extend(response.contents().iter().filter_map(|obj| {
                obj.key().map(|key| StoredObject {
                    key: key.to_string(),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                })
            }));

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }
}
