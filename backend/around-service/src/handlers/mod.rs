/// HTTP handlers for around-service
///
/// - Posts: multipart ingestion of a geo-tagged post with its image
/// - Search: proximity search around a point
/// - Health: liveness probe
pub mod health;
pub mod posts;
pub mod search;

pub use health::health;
pub use posts::create_post;
pub use search::search_posts;
