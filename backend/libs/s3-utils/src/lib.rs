/// Shared S3 utilities
///
/// Provides the AWS S3 client, configuration, and the object operations
/// the media pipeline needs.
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use std::sync::Arc;
use thiserror::Error;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::{ObjectMetadata, StoredObject};

/// Re-exported so callers can build request bodies without a direct SDK dependency.
pub use aws_sdk_s3::primitives::ByteStream;

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("bucket {bucket} is not reachable: {message}")]
    Bucket { bucket: String, message: String },
    #[error("put_object failed for {key}: {message}")]
    Put { key: String, message: String },
    #[error("setting public-read ACL failed for {key}: {message}")]
    Acl { key: String, message: String },
    #[error("head_object failed for {key}: {message}")]
    Head { key: String, message: String },
    #[error("delete_object failed for {key}: {message}")]
    Delete { key: String, message: String },
    #[error("list_objects failed: {0}")]
    List(String),
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create a client with explicit configuration
    pub async fn with_config(config: S3Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "around-service",
            ));
        }

        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(config.path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Get reference to underlying AWS S3 client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get S3 configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }
}
