use async_trait::async_trait;
use elasticsearch::{
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    Elasticsearch, ExistsParts, IndexParts, SearchParts,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::models::{Distance, Location, Post, PostId, SearchHit};

/// Geo-point field every post document carries.
pub const LOCATION_FIELD: &str = "location";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("index responded with status {0}: {1}")]
    Status(u16, String),
    #[error("failed to decode search response: {0}")]
    Decode(String),
    #[error("index unavailable: {0}")]
    Unavailable(String),
}

/// Document store with a geo-distance predicate, scoped to one post index.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn index_exists(&self) -> Result<bool, IndexError>;

    async fn create_index(&self, mapping: Value) -> Result<(), IndexError>;

    /// Write `post` under `id`; the write is visible to the next search.
    async fn put_post(&self, id: PostId, post: &Post) -> Result<(), IndexError>;

    /// Every document whose `field` lies within `distance` of `center`,
    /// boundary inclusive, in whatever order the index returns them.
    async fn geo_distance_query(
        &self,
        field: &str,
        center: Location,
        distance: Distance,
        size: i64,
    ) -> Result<Vec<SearchHit>, IndexError>;

    async fn contains(&self, id: PostId) -> Result<bool, IndexError>;
}

/// Mapping declaring `location` as a geo-point.
pub fn post_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "user": { "type": "keyword" },
                "message": { "type": "text" },
                "location": { "type": "geo_point" },
                "url": { "type": "keyword", "index": false }
            }
        }
    })
}

/// Create the post index with its geo mapping unless it already exists.
pub async fn ensure_post_index(index: &dyn DocumentIndex) -> Result<bool, IndexError> {
    if index.index_exists().await? {
        return Ok(false);
    }
    index.create_index(post_index_mapping()).await?;
    Ok(true)
}

/// Body of a geo-distance filter query.
pub fn geo_distance_body(field: &str, center: Location, distance: Distance, size: i64) -> Value {
    let mut geo = serde_json::Map::new();
    geo.insert("distance".to_string(), Value::String(distance.to_string()));
    geo.insert(
        field.to_string(),
        json!({ "lat": center.lat, "lon": center.lon }),
    );

    json!({
        "size": size.max(1),
        "query": {
            "bool": {
                "filter": { "geo_distance": Value::Object(geo) }
            }
        }
    })
}

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Elasticsearch,
    post_index: String,
}

impl ElasticsearchIndex {
    pub fn new(url: &str, post_index: &str) -> Result<Self, IndexError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;
        let client = Elasticsearch::new(transport);

        Ok(Self {
            client,
            post_index: post_index.to_string(),
        })
    }

    pub fn post_index(&self) -> &str {
        &self.post_index
    }
}

#[async_trait]
impl DocumentIndex for ElasticsearchIndex {
    async fn index_exists(&self) -> Result<bool, IndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.post_index.as_str()]))
            .send()
            .await?;

        existence_from_status(response.status_code().as_u16())
    }

    async fn create_index(&self, mapping: Value) -> Result<(), IndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.post_index))
            .body(mapping)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status(status.as_u16(), body));
        }

        tracing::info!(index = %self.post_index, "created post index");
        Ok(())
    }

    async fn put_post(&self, id: PostId, post: &Post) -> Result<(), IndexError> {
        let id = id.to_string();
        let response = self
            .client
            .index(IndexParts::IndexId(&self.post_index, &id))
            .body(post)
            .refresh(Refresh::True)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status(status.as_u16(), body));
        }
        Ok(())
    }

    async fn geo_distance_query(
        &self,
        field: &str,
        center: Location,
        distance: Distance,
        size: i64,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.post_index.as_str()]))
            .body(geo_distance_body(field, center, distance, size))
            .send()
            .await?;

        let status = response.status_code();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(IndexError::Status(status.as_u16(), body));
        }

        decode_hits(&body)
    }

    async fn contains(&self, id: PostId) -> Result<bool, IndexError> {
        let id = id.to_string();
        let response = self
            .client
            .exists(ExistsParts::IndexId(&self.post_index, &id))
            .send()
            .await?;

        existence_from_status(response.status_code().as_u16())
    }
}

/// HEAD semantics: 200 exists, 404 absent, anything else is a failure.
fn existence_from_status(status: u16) -> Result<bool, IndexError> {
    match status {
        200 => Ok(true),
        404 => Ok(false),
        other => Err(IndexError::Status(other, String::new())),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    took: Option<u64>,
    hits: InnerHits,
}

#[derive(Debug, Deserialize)]
struct InnerHits {
    hits: Vec<PostHit>,
}

#[derive(Debug, Deserialize)]
struct PostHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Post,
}

/// Decode a raw search response against the post schema.
pub fn decode_hits(body: &str) -> Result<Vec<SearchHit>, IndexError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| IndexError::Decode(e.to_string()))?;

    tracing::debug!(
        took_ms = response.took.unwrap_or_default(),
        hits = response.hits.hits.len(),
        "geo distance query completed"
    );

    response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let id = PostId::parse(&hit.id)
                .ok_or_else(|| IndexError::Decode(format!("document id {} is not a UUID", hit.id)))?;
            Ok(SearchHit {
                id,
                post: hit.source,
            })
        })
        .collect()
}
