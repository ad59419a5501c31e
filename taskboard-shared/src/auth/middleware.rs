/// Request authentication for Axum
///
/// Both entry points into the system authenticate the same way: HTTP
/// requests carry `Authorization: Bearer <token>` and realtime handshakes
/// carry a `token` query parameter. The two extractors here normalize both
/// into an [`AuthUser`] or an [`AuthError`] with a distinguishable
/// missing-vs-invalid reason.
///
/// After successful authentication the middleware layer in the API crate
/// inserts `AuthUser` into the request extensions, where handlers pick it
/// up via Axum's `Extension` extractor.
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{verify_token, TokenError};

/// Authenticated identity attached to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Authenticated user id
    pub uid: Uuid,

    /// Role claim carried by the token
    pub role: String,
}

/// Error type for authentication failures
///
/// `NoToken` and `InvalidToken` map to distinct status codes (401 and 403)
/// so clients can tell an absent credential from a rejected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented
    NoToken,

    /// Credential failed verification (bad signature, wrong issuer, ...)
    InvalidToken,

    /// Credential was valid once but has expired
    ExpiredToken,
}

impl AuthError {
    /// Human-readable reason sent to the client
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::NoToken => "No token provided",
            AuthError::InvalidToken => "Invalid token",
            AuthError::ExpiredToken => "Token expired",
        }
    }

    /// HTTP status for the failure
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NoToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::ExpiredToken => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Authenticates an HTTP request from its `Authorization` header
///
/// # Errors
///
/// - `AuthError::NoToken` if the header is absent or not a Bearer scheme
/// - `AuthError::ExpiredToken` / `AuthError::InvalidToken` if verification fails
pub fn authenticate_headers(headers: &HeaderMap, secret: &str) -> Result<AuthUser, AuthError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::NoToken)?;

    authenticate_token(token, secret)
}

/// Authenticates a realtime handshake from its `token` query parameter
pub fn authenticate_query(token: Option<&str>, secret: &str) -> Result<AuthUser, AuthError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::NoToken)?;

    authenticate_token(token, secret)
}

fn authenticate_token(token: &str, secret: &str) -> Result<AuthUser, AuthError> {
    let claims = verify_token(token, secret).map_err(|e| match e {
        TokenError::Expired => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(AuthUser {
        uid: claims.uid,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{issue_token, sign_claims, Claims};
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_authenticate_headers_ok() {
        let uid = Uuid::new_v4();
        let token = issue_token(uid, "manager", SECRET).unwrap();

        let user = authenticate_headers(&headers_with(&format!("Bearer {}", token)), SECRET)
            .expect("Should authenticate");
        assert_eq!(user.uid, uid);
        assert_eq!(user.role, "manager");
    }

    #[test]
    fn test_authenticate_headers_missing() {
        let err = authenticate_headers(&HeaderMap::new(), SECRET).unwrap_err();
        assert_eq!(err, AuthError::NoToken);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_headers_wrong_scheme() {
        let err = authenticate_headers(&headers_with("Basic abc123"), SECRET).unwrap_err();
        assert_eq!(err, AuthError::NoToken);
    }

    #[test]
    fn test_authenticate_headers_invalid() {
        let err = authenticate_headers(&headers_with("Bearer garbage"), SECRET).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_authenticate_query_missing_vs_expired() {
        let missing = authenticate_query(None, SECRET).unwrap_err();
        assert_eq!(missing, AuthError::NoToken);

        let empty = authenticate_query(Some(""), SECRET).unwrap_err();
        assert_eq!(empty, AuthError::NoToken);

        let expired = sign_claims(
            &Claims::with_ttl(Uuid::new_v4(), "member", Duration::seconds(-3600)),
            SECRET,
        )
        .unwrap();
        let err = authenticate_query(Some(&expired), SECRET).unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);
        assert_ne!(err.status(), missing.status());
    }
}
