/// S3 configuration shared across services
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket that receives uploaded media. Must already exist.
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack, GCS interop)
    pub endpoint: Option<String>,
    /// Static credentials; the default provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL objects are publicly served from (CDN or website endpoint)
    pub public_base_url: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "post-images".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint: non_empty_var("S3_ENDPOINT"),
            access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
            public_base_url: non_empty_var("S3_PUBLIC_BASE_URL"),
            path_style: std::env::var("S3_PATH_STYLE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }

    /// Canonical public URL of an object.
    ///
    /// Preference order: explicit public base URL, then the custom endpoint,
    /// then the regional AWS host.
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_base_url {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }

        match (&self.endpoint, self.path_style) {
            (Some(endpoint), true) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            }
            (Some(endpoint), false) => {
                let (scheme, host) = endpoint
                    .split_once("://")
                    .unwrap_or(("https", endpoint.as_str()));
                format!(
                    "{}://{}.{}/{}",
                    scheme,
                    self.bucket,
                    host.trim_end_matches('/'),
                    key
                )
            }
            (None, true) => format!(
                "https://s3.{}.amazonaws.com/{}/{}",
                self.region, self.bucket, key
            ),
            (None, false) => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
