use serde::{Deserialize, Serialize};

/// Unified JSON error body returned by every service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP reason phrase, e.g. "Internal Server Error"
    pub error: String,

    /// Short, human readable reason
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error category used by clients to route handling:
    /// - "validation_error" - malformed input
    /// - "authentication_error" - missing or invalid credentials
    /// - "server_error" - a backing store or internal failure
    pub error_type: String,

    /// Stable machine-readable code, see [`error_codes`]
    pub code: String,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Stable error codes shared by all services.
pub mod error_codes {
    // Authentication
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

    // Requests
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const MEDIA_NOT_AVAILABLE: &str = "MEDIA_NOT_AVAILABLE";

    // Backing stores
    pub const BLOB_STORE_ERROR: &str = "BLOB_STORE_ERROR";
    pub const INDEX_ERROR: &str = "INDEX_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";

    // Generic
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}
