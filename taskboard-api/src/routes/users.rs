/// User profile endpoints
///
/// # Endpoints
///
/// - `PUT /api/users/:user_uid` - Update the caller's own profile
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{middleware::AuthUser, password},
    models::user::{UpdateUser, User},
};
use uuid::Uuid;

/// Profile update request
///
/// All fields optional; only present fields are written.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name
    pub name: Option<String>,

    /// New avatar URL
    pub avatar_url: Option<String>,

    /// New plaintext password, hashed before storage
    pub password: Option<String>,
}

/// Profile update handler
///
/// A user may only update their own row; the path uid must match the
/// authenticated uid.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown user
/// - `403 Forbidden`: Path uid is not the caller
/// - `500 Internal Server Error`: Store failure
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_uid): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    if auth.uid != user_uid {
        return Err(ApiError::Forbidden(
            "Cannot update another user's profile".to_string(),
        ));
    }

    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(password::hash_password(password)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        user_uid,
        UpdateUser {
            name: req.name,
            avatar_url: req.avatar_url,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_uid = %user.uid, "Updated user profile");

    Ok(Json(user))
}
