/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and verification (HS256, 24 hour expiry)
/// - [`middleware`]: Request authentication shared by the HTTP layer and
///   the realtime handshake
pub mod jwt;
pub mod middleware;
pub mod password;
