//! In-memory doubles for the blob store and the document index.
//!
//! Both record into a shared event log so tests can assert the order in
//! which the pipeline touched each store.
#![allow(dead_code)]

use around_service::app::AppState;
use around_service::config::{
    UploadConfig, DEFAULT_BLOCKLIST, DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_KM,
};
use around_service::media::MediaUpload;
use around_service::middleware::Claims;
use around_service::models::{Distance, Location, Post, PostId, SearchHit};
use around_service::moderation::ContentFilter;
use around_service::services::{
    BlobStore, BlobStoreError, DocumentIndex, IndexError, IngestionPipeline, ProximitySearch,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use s3_utils::StoredObject;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BLOB_BASE_URL: &str = "https://blobs.test";

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// Blob store keeping objects in a map and serving them from `BLOB_BASE_URL`.
#[derive(Clone)]
pub struct InMemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, StoredBlob>>>,
    fail_puts: Arc<AtomicBool>,
    put_delay: Option<std::time::Duration>,
    events: EventLog,
}

impl InMemoryBlobStore {
    pub fn new(events: EventLog) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_puts: Arc::new(AtomicBool::new(false)),
            put_delay: None,
            events,
        }
    }

    pub fn with_put_delay(mut self, delay: std::time::Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Seeds an object as if it had been written `age` ago.
    pub fn insert_aged(&self, key: &str, age: Duration) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                bytes: Bytes::from_static(b"seed"),
                content_type: None,
                last_modified: Utc::now() - age,
            },
        );
    }

    pub fn url_for(key: &str) -> String {
        format!("{}/{}", BLOB_BASE_URL, key)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_public(&self, key: &str, media: &MediaUpload) -> Result<String, BlobStoreError> {
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Unavailable("injected put failure".into()));
        }

        let bytes = media
            .read_all()
            .await
            .map_err(|e| BlobStoreError::Body(e.to_string()))?;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: media.content_type.clone(),
                last_modified: Utc::now(),
            },
        );
        self.events.lock().unwrap().push(format!("blob:{}", key));

        Ok(Self::url_for(key))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.objects.lock().unwrap().remove(key);
        self.events.lock().unwrap().push(format!("blob-delete:{}", key));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobStoreError> {
        let mut objects: Vec<StoredObject> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, blob)| StoredObject {
                key: key.clone(),
                last_modified: Some(blob.last_modified),
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}

/// Index answering geo-distance queries with the haversine predicate.
#[derive(Clone)]
pub struct InMemoryIndex {
    docs: Arc<Mutex<HashMap<PostId, Post>>>,
    created: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_queries: Arc<AtomicBool>,
    events: EventLog,
}

impl InMemoryIndex {
    pub fn new(events: EventLog) -> Self {
        Self {
            docs: Arc::new(Mutex::new(HashMap::new())),
            created: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            fail_queries: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: PostId) -> Option<Post> {
        self.docs.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// Writes a document directly, bypassing the pipeline.
    pub fn seed(&self, post: Post) -> PostId {
        let id = PostId::generate();
        self.docs.lock().unwrap().insert(id, post);
        id
    }
}

#[async_trait]
impl DocumentIndex for InMemoryIndex {
    async fn index_exists(&self) -> Result<bool, IndexError> {
        Ok(self.created.load(Ordering::SeqCst))
    }

    async fn create_index(&self, _mapping: Value) -> Result<(), IndexError> {
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn put_post(&self, id: PostId, post: &Post) -> Result<(), IndexError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("injected write failure".into()));
        }
        self.docs.lock().unwrap().insert(id, post.clone());
        self.events.lock().unwrap().push(format!("index:{}", id));
        Ok(())
    }

    async fn geo_distance_query(
        &self,
        _field: &str,
        center: Location,
        distance: Distance,
        size: i64,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(IndexError::Status(503, "injected query failure".into()));
        }
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, post)| post.location.within(&center, distance))
            .take(size.max(0) as usize)
            .map(|(id, post)| SearchHit {
                id: *id,
                post: post.clone(),
            })
            .collect())
    }

    async fn contains(&self, id: PostId) -> Result<bool, IndexError> {
        Ok(self.docs.lock().unwrap().contains_key(&id))
    }
}

pub fn post(user: &str, message: &str, lat: f64, lon: f64) -> Post {
    Post {
        user: user.to_string(),
        message: message.to_string(),
        location: Location::new(lat, lon),
        url: Some(format!("{}/seeded", BLOB_BASE_URL)),
    }
}

pub fn image(bytes: &'static [u8]) -> MediaUpload {
    MediaUpload::from_bytes(Bytes::from_static(bytes), Some("image/png"))
}

pub fn split_default_blocklist() -> Vec<String> {
    DEFAULT_BLOCKLIST.split(',').map(str::to_string).collect()
}

pub fn search_engine(index: &InMemoryIndex) -> ProximitySearch {
    ProximitySearch::new(
        Arc::new(index.clone()),
        ContentFilter::new(split_default_blocklist()),
        DEFAULT_RADIUS_KM,
        DEFAULT_MAX_RESULTS,
    )
}

pub fn app_state(blob_store: &InMemoryBlobStore, index: &InMemoryIndex) -> AppState {
    AppState {
        pipeline: IngestionPipeline::new(Arc::new(blob_store.clone()), Arc::new(index.clone())),
        search: search_engine(index),
        upload: UploadConfig {
            memory_threshold_bytes: 1024,
        },
        jwt_secret: JWT_SECRET.to_string(),
    }
}

pub fn bearer(username: &str) -> String {
    let token = encode(
        &Header::default(),
        &Claims {
            username: username.to_string(),
            exp: Some((Utc::now() + Duration::hours(1)).timestamp() as usize),
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

pub const BOUNDARY: &str = "----around-test-boundary";

/// Hand-built multipart/form-data body.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
