/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `Result<T, ApiError>`, which converts to the
/// appropriate status code and a JSON `{"error": ...}` body.
///
/// The status-code contract matches what existing clients expect:
/// unknown resources and duplicate emails report 400, a missing bearer
/// token reports 401, and an invalid or expired token reports 403.
///
/// # Example
///
/// ```ignore
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(serde_json::json!({ "data": data })))
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskboard_shared::auth::{jwt::TokenError, middleware::AuthError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Required fields were absent from the request body (400)
    MissingFields(Vec<String>),

    /// Registration attempted with an email that already exists (400)
    DuplicateEmail,

    /// Login failed; same message whether the email or password was wrong (401)
    InvalidCredentials,

    /// Malformed request (400)
    BadRequest(String),

    /// Authentication failed (401 for a missing credential, 403 otherwise)
    Auth(AuthError),

    /// Authenticated but not allowed to act on this resource (403)
    Forbidden(String),

    /// Unknown resource; the public API reports these as 400
    NotFound(String),

    /// Unexpected store or runtime failure (500, details logged only)
    InternalError(String),
}

impl ApiError {
    /// Builds a `MissingFields` error from field names
    pub fn missing_fields(fields: Vec<&'static str>) -> Self {
        ApiError::MissingFields(fields.into_iter().map(String::from).collect())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Names of the absent required fields, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            ApiError::DuplicateEmail => write!(f, "Email already exists"),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Auth(err) => write!(f, "{}", err.message()),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            ApiError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                "Missing required fields".to_string(),
                Some(fields),
            ),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already exists".to_string(),
                None,
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                None,
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Auth(err) => (err.status(), err.message().to_string(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::InternalError(msg) => {
                // Log the details server-side; clients get an opaque message.
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // Unique-constraint races on email surface as duplicates.
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::DuplicateEmail;
                    }
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

/// Convert token errors to API errors
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Auth(AuthError::ExpiredToken),
            TokenError::Invalid(_) => ApiError::Auth(AuthError::InvalidToken),
            TokenError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}
