use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::metrics::{POSTS_FILTERED_TOTAL, SEARCH_REQUESTS_TOTAL};
use crate::models::{Distance, Post, SearchQuery};
use crate::moderation::ContentFilter;
use crate::services::document_index::{DocumentIndex, LOCATION_FIELD};

/// Answers "which posts lie within D of (lat, lon)" with moderation applied.
#[derive(Clone)]
pub struct ProximitySearch {
    index: Arc<dyn DocumentIndex>,
    filter: ContentFilter,
    default_radius: Distance,
    max_results: i64,
}

impl ProximitySearch {
    pub fn new(
        index: Arc<dyn DocumentIndex>,
        filter: ContentFilter,
        default_radius_km: f64,
        max_results: i64,
    ) -> Self {
        Self {
            index,
            filter,
            default_radius: Distance::km(default_radius_km),
            max_results,
        }
    }

    pub fn default_radius(&self) -> Distance {
        self.default_radius
    }

    /// Caller radius overrides the default; it must be a finite, non-negative number.
    pub fn resolve_radius(&self, requested: Option<f64>) -> Result<Distance> {
        match requested {
            None => Ok(self.default_radius),
            Some(km) => {
                let radius = Distance::km(km);
                if radius.is_valid() {
                    Ok(radius)
                } else {
                    Err(AppError::BadRequest(format!("invalid range: {km}")))
                }
            }
        }
    }

    pub async fn search(&self, query: SearchQuery) -> Result<Vec<Post>> {
        let radius = self.resolve_radius(query.radius_km)?;
        SEARCH_REQUESTS_TOTAL.inc();

        tracing::info!(
            lat = query.lat,
            lon = query.lon,
            radius_km = radius.km,
            "search received"
        );

        let hits = self
            .index
            .geo_distance_query(LOCATION_FIELD, query.center(), radius, self.max_results)
            .await
            .map_err(|e| {
                tracing::error!("geo distance query failed: {}", e);
                AppError::from(e)
            })?;

        let found = hits.len();
        let posts: Vec<Post> = hits
            .into_iter()
            .map(|hit| hit.post)
            .filter(|post| !self.filter.is_filtered(&post.message))
            .collect();

        let filtered = found - posts.len();
        if filtered > 0 {
            POSTS_FILTERED_TOTAL.inc_by(filtered as u64);
        }

        tracing::info!(found, filtered, returned = posts.len(), "search completed");
        Ok(posts)
    }
}
