//! Unified API error handling
//!
//! Every endpoint returns `Result<T, ApiError>` and errors render as
//! `{error, message, request_id}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbError;
use crate::service::auth::AuthError;
use crate::service::blob::BlobError;
use crate::service::llm::TextGenerationError;
use crate::service::notes::NoteError;

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or rejected bearer token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Blob storage error (500)
    #[error("Blob storage error: {0}")]
    Storage(String),

    /// External service error (502)
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal_error",
            ApiError::Database(_) => "database_error",
            ApiError::Storage(_) => "storage_error",
            ApiError::ExternalService(_) => "external_service_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = self.error_type();

        if status.is_server_error() {
            tracing::error!(
                error_type = error_type,
                status = status.as_u16(),
                message = %self,
                "API error"
            );
        } else {
            tracing::warn!(
                error_type = error_type,
                status = status.as_u16(),
                message = %self,
                "API error"
            );
        }

        let mut response = HttpResponse::build(status);
        if matches!(self, ApiError::Unauthorized(_)) {
            response.insert_header(("WWW-Authenticate", "Bearer"));
        }
        response.json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => ApiError::NotFound(id),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(name) => ApiError::NotFound(name),
            BlobError::InvalidName(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Storage(err.to_string()),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Blob(e) => e.into(),
            NoteError::Db(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Upstream(_) => ApiError::ExternalService(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<TextGenerationError> for ApiError {
    fn from(err: TextGenerationError) -> Self {
        ApiError::ExternalService(err.to_string())
    }
}
