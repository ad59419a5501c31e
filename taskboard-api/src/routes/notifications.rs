/// Notification endpoints
///
/// # Endpoints
///
/// - `GET /api/notifications` - The caller's notifications, newest first
/// - `PATCH /api/notifications/:notification_uid/read` - Mark one read
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskboard_shared::{auth::middleware::AuthUser, models::notification::Notification};
use uuid::Uuid;

/// Lists the authenticated user's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = Notification::list_by_user(&state.db, auth.uid).await?;

    Ok(Json(notifications))
}

/// Marks one of the authenticated user's notifications as read
///
/// The lookup is scoped to the caller, so another user's notification
/// uid reports not-found rather than leaking its existence.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_uid): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = Notification::mark_read(&state.db, notification_uid, auth.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}
