//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kestrel API                            │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<Json<T>, ApiError>                                              │
//! │       │                                                                 │
//! │       ├── DbError::NotFound ─────────────────► 404 NOT_FOUND            │
//! │       ├── DbError::UniqueViolation ──────────► 409 DUPLICATE            │
//! │       ├── CoreError::Validation ─────────────► 400 VALIDATION_ERROR     │
//! │       ├── CoreError::InsufficientStock ──────► 400 INSUFFICIENT_STOCK   │
//! │       ├── CoreError::BusinessRule ───────────► 400 BUSINESS_RULE        │
//! │       ├── CoreError::Unauthorized ───────────► 401 UNAUTHORIZED         │
//! │       ├── CoreError::Forbidden ──────────────► 403 FORBIDDEN            │
//! │       └── anything else ── logged ───────────► 500 DATABASE_ERROR /     │
//! │                                                    INTERNAL             │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Product not found: 42" }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kestrel_core::CoreError;
use kestrel_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Wireless Mouse: available 5, requested 6"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Unique key already taken (409)
    Duplicate,

    /// Not enough units on hand (400)
    InsufficientStock,

    /// Request breaks a business rule (400)
    BusinessRule,

    /// Missing or bad credentials (401)
    Unauthorized,

    /// Role may not perform the action (403)
    Forbidden,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::BusinessRule => StatusCode::BAD_REQUEST,
            ErrorCode::Duplicate => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Domain(e) => e.into(),
            DbError::CheckViolation(e) => {
                tracing::warn!("Check constraint rejected a write: {}", e);
                ApiError::validation("Value out of range")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::Unauthorized(_) => ApiError::new(ErrorCode::Unauthorized, message),
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Forbidden, message),
            CoreError::BusinessRule(_) => ApiError::new(ErrorCode::BusinessRule, message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

// Malformed bodies and query strings are client errors.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::{Action, Resource, Role, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (DbError::not_found("Product", "p1").into(), StatusCode::NOT_FOUND),
            (DbError::duplicate("sku", "MOU-002").into(), StatusCode::CONFLICT),
            (
                CoreError::InsufficientStock {
                    product: "Wireless Mouse".to_string(),
                    available: 5,
                    requested: 6,
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DbError::from(ValidationError::required("title")).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Unauthorized("no token".to_string()).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                CoreError::Forbidden {
                    role: Role::Viewer,
                    resource: Resource::Products,
                    action: Action::Create,
                }
                .into(),
                StatusCode::FORBIDDEN,
            ),
            (
                DbError::QueryFailed("disk I/O error".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.code.status(), status, "{error}");
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error: ApiError = DbError::Internal("secret path /var/db".to_string()).into();
        assert_eq!(error.code, ErrorCode::DatabaseError);
        assert!(!error.message.contains("/var/db"));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ApiError::not_found("Invoice", "i1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Invoice not found: i1");
    }
}
