/// Bearer token issuance and verification
///
/// Tokens are signed with HS256 (HMAC-SHA256) and carry the user's id and
/// role. A token expires 24 hours after issuance. The same verification
/// path gates both HTTP requests (`Authorization: Bearer <token>`) and
/// realtime handshakes (`token` query parameter).
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{issue_token, verify_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let uid = Uuid::new_v4();
/// let token = issue_token(uid, "member", "your-secret-key-at-least-32-bytes")?;
///
/// let claims = verify_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(claims.uid, uid);
/// assert_eq!(claims.role, "member");
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value
const ISSUER: &str = "taskboard";

/// Token lifetime
const TOKEN_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token failed signature, issuer, or format checks
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims embedded in every bearer token
///
/// # Standard Claims
///
/// - `iss`: Issuer (always "taskboard")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp (24 hours after issuance)
///
/// # Custom Claims
///
/// - `uid`: Authenticated user id
/// - `role`: The user's role string as stored on the row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub uid: Uuid,

    /// Role string (`admin`, `manager`, `member` by convention)
    pub role: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24-hour expiration
    pub fn new(uid: Uuid, role: impl Into<String>) -> Self {
        Self::with_ttl(uid, role, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom lifetime (used by expiry tests)
    pub fn with_ttl(uid: Uuid, role: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            uid,
            role: role.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues a signed bearer token for a user
///
/// # Errors
///
/// Returns `TokenError::CreateError` if signing fails.
pub fn issue_token(uid: Uuid, role: impl Into<String>, secret: &str) -> Result<String, TokenError> {
    sign_claims(&Claims::new(uid, role), secret)
}

/// Signs an explicit claims value
///
/// Exposed separately so tests can issue tokens with custom expirations.
pub fn sign_claims(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a bearer token and extracts its claims
///
/// Checks the signature, the expiration, and the issuer. Expired tokens
/// are reported as `TokenError::Expired`, everything else as
/// `TokenError::Invalid`, so callers can surface distinguishable reasons.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
