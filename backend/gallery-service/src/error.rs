/// Error types for Gallery Service
///
/// Upload rejections are user errors and map to 4xx responses carrying the
/// rejection message and code. Storage and internal failures map to a
/// generic 500 and their details are logged. `middleware::ServerErrors`
/// echoes the details to the caller when the service runs in development
/// mode.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

use crate::db::StoreError;
use crate::models::ErrorResponse;
use crate::upload::{IngestError, UploadRejection};

/// Result type for gallery-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// 500 response, with `detail` echoed when given
pub fn internal_error_response(detail: Option<&str>) -> HttpResponse {
    let body = match detail {
        Some(detail) => ErrorResponse::new(format!("Unexpected error: {}", detail)),
        None => ErrorResponse::new("Internal server error"),
    };
    HttpResponse::InternalServerError().json(body)
}

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Database operation failed
    DatabaseError(String),

    /// Upload failed an admission gate
    Rejected(UploadRejection),

    /// Resource not found
    NotFound(String),

    /// Malformed request
    BadRequest(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Rejected(rejection) => write!(f, "{}", rejection),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Failures of the service itself rather than of the request
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::Internal(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Rejected(UploadRejection::SizeInvalid(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Rejected(UploadRejection::UnsupportedFormat(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Rejected(UploadRejection::DimensionsExceeded { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::NotFound(_) => return HttpResponse::build(status).finish(),
            AppError::Rejected(rejection) => {
                ErrorResponse::new(rejection.to_string()).with_code(rejection.code())
            }
            AppError::BadRequest(msg) => ErrorResponse::new(msg.clone()).with_code("bad_request"),
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed with internal error");
                return internal_error_response(None);
            }
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        AppError::Rejected(rejection)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Rejected(rejection) => AppError::Rejected(rejection),
            IngestError::Storage(err) => err.into(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
