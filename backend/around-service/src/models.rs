/// Data models for geo-tagged posts and proximity queries
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Mean earth radius used by the index's arc distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Identifier shared by a post's blob object and its index document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Username of an already-authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub fn username(&self) -> &str {
        &self.0
    }
}

/// WGS84 point, stored as a `geo_point` on the index side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance using the Haversine formula (kilometers)
    pub fn distance_km(&self, other: &Location) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Inclusive radius check: a point exactly `radius_km` away is inside.
    pub fn within(&self, center: &Location, radius: Distance) -> bool {
        self.distance_km(center) <= radius.km
    }
}

/// A post as stored in the index and returned to searchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
    /// Public URL of the attached media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Index hit decoded against the post schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: PostId,
    pub post: Post,
}

/// Search radius in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub km: f64,
}

impl Distance {
    pub fn km(km: f64) -> Self {
        Self { km }
    }

    pub fn is_valid(&self) -> bool {
        self.km.is_finite() && self.km >= 0.0
    }
}

impl fmt::Display for Distance {
    /// Renders the index distance syntax, e.g. `200km`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}km", self.km)
    }
}

/// Per-request proximity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchQuery {
    pub lat: f64,
    pub lon: f64,
    /// Falls back to the configured default when `None`
    pub radius_km: Option<f64>,
}

impl SearchQuery {
    pub fn center(&self) -> Location {
        Location::new(self.lat, self.lon)
    }
}

/// Text fields of an ingestion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    pub message: String,
    pub lat: f64,
    pub lon: f64,
}

/// Response body of a successful ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub id: PostId,
}

/// Lax decimal parse: empty or malformed input degrades to `0.0`.
pub fn parse_coordinate(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}
