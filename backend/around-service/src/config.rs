/// Configuration management for around-service
///
/// Loads configuration from environment variables with sensible defaults.
/// Every constant a component depends on (index name, default radius,
/// blocklist) lives here and is handed to the component at construction.
use s3_utils::S3Config;
use serde::Deserialize;

pub const DEFAULT_POST_INDEX: &str = "around";
pub const DEFAULT_RADIUS_KM: f64 = 200.0;
pub const DEFAULT_MAX_RESULTS: i64 = 1000;
/// Elasticsearch `index.max_result_window` default; larger windows fail every query.
pub const MAX_RESULT_WINDOW: i64 = 10_000;
/// 32 MiB kept in memory before a media part spills to a temp file.
pub const DEFAULT_MEMORY_THRESHOLD_BYTES: usize = 32 << 20;
pub const DEFAULT_BLOCKLIST: &str = "fuck,nigger";
pub const DEFAULT_SWEEP_GRACE_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub upload: UploadConfig,
    pub moderation: ModerationConfig,
    pub s3: S3Config,
    pub sweep: SweepConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret used to verify caller tokens
    pub jwt_secret: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchConfig {
    pub elasticsearch_url: String,
    pub post_index: String,
    pub default_radius_km: f64,
    pub max_results: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UploadConfig {
    pub memory_threshold_bytes: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModerationConfig {
    pub blocklist: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SweepConfig {
    pub grace_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let default_radius_km = parse_var("SEARCH_DEFAULT_RADIUS_KM", DEFAULT_RADIUS_KM)?;
        if !default_radius_km.is_finite() || default_radius_km < 0.0 {
            return Err(ConfigError::Invalid {
                name: "SEARCH_DEFAULT_RADIUS_KM",
                value: default_radius_km.to_string(),
            });
        }

        let max_results = parse_var("SEARCH_MAX_RESULTS", DEFAULT_MAX_RESULTS)?;
        if !(1..=MAX_RESULT_WINDOW).contains(&max_results) {
            return Err(ConfigError::Invalid {
                name: "SEARCH_MAX_RESULTS",
                value: max_results.to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: std::env::var("AROUND_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("AROUND_SERVICE_PORT", 8080)?,
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            cors: CorsConfig {
                allowed_origins: split_list(
                    &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                ),
            },
            auth: AuthConfig { jwt_secret },
            search: SearchConfig {
                elasticsearch_url: std::env::var("ELASTICSEARCH_URL")
                    .unwrap_or_else(|_| "http://localhost:9200".to_string()),
                post_index: std::env::var("ELASTICSEARCH_POST_INDEX")
                    .unwrap_or_else(|_| DEFAULT_POST_INDEX.to_string()),
                default_radius_km,
                max_results,
            },
            upload: UploadConfig {
                memory_threshold_bytes: parse_var(
                    "UPLOAD_MEMORY_THRESHOLD_BYTES",
                    DEFAULT_MEMORY_THRESHOLD_BYTES,
                )?,
            },
            moderation: ModerationConfig {
                blocklist: split_list(
                    &std::env::var("MODERATION_BLOCKLIST")
                        .unwrap_or_else(|_| DEFAULT_BLOCKLIST.to_string()),
                ),
            },
            s3: S3Config::from_env(),
            sweep: SweepConfig {
                grace_secs: parse_var("SWEEP_GRACE_SECS", DEFAULT_SWEEP_GRACE_SECS)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(default),
    }
}

/// Comma-separated list, whitespace trimmed, empty entries dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
