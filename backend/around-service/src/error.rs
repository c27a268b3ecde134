/// Error types for around-service
///
/// Every failure on the request path ends up here and is rendered as a
/// JSON `ErrorResponse`; nothing on the request path aborts the process.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};

use crate::services::blob_store::BlobStoreError;
use crate::services::document_index::IndexError;

/// Result type for around-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request (bad multipart body, invalid range)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid caller identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request carried no media part
    #[error("Image is not available: {0}")]
    MediaNotAvailable(String),

    /// Blob write, ACL change or URL lookup failed
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Index unreachable, write rejected or query rejected
    #[error("Index error: {0}")]
    Index(String),

    /// Index response did not match the post schema
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn error_type_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::BadRequest(_) => ("validation_error", error_codes::INVALID_REQUEST),
            AppError::Unauthorized(_) => ("authentication_error", error_codes::UNAUTHORIZED),
            AppError::MediaNotAvailable(_) => ("server_error", error_codes::MEDIA_NOT_AVAILABLE),
            AppError::BlobStore(_) => ("server_error", error_codes::BLOB_STORE_ERROR),
            AppError::Index(_) => ("server_error", error_codes::INDEX_ERROR),
            AppError::Decode(_) => ("server_error", error_codes::DECODE_ERROR),
            AppError::Internal(_) => ("server_error", error_codes::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::MediaNotAvailable(_)
            | AppError::BlobStore(_)
            | AppError::Index(_)
            | AppError::Decode(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.error_type_and_code();

        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &self.to_string(),
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<BlobStoreError> for AppError {
    fn from(err: BlobStoreError) -> Self {
        AppError::BlobStore(err.to_string())
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        match &err {
            IndexError::Decode(_) => AppError::Decode(err.to_string()),
            _ => AppError::Index(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn missing_media_renders_internal_error_with_code() {
        let err = AppError::MediaNotAvailable("no image part".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "MEDIA_NOT_AVAILABLE");
        assert_eq!(json["status"], 500);
        assert_eq!(json["error"], "Internal Server Error");
    }

    #[test]
    fn failures_are_distinguishable_by_code() {
        let blob = AppError::BlobStore("x".into());
        let index = AppError::Index("x".into());
        assert_eq!(blob.status_code(), index.status_code());
        assert_ne!(blob.error_type_and_code().1, index.error_type_and_code().1);
    }

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            AppError::BadRequest("range".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn decode_index_errors_keep_their_kind() {
        let err: AppError = IndexError::Decode("missing field `user`".into()).into();
        assert!(matches!(err, AppError::Decode(_)));

        let err: AppError = IndexError::Status(503, "unavailable".into()).into();
        assert!(matches!(err, AppError::Index(_)));
    }
}
