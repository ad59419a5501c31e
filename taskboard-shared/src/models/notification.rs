/// Notification model
///
/// Per-user notifications, queried newest first. Rows are created when a
/// comment mentions a user; the matching realtime event carries the full
/// row.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Notification row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification id
    pub uid: Uuid,

    /// User the notification belongs to
    pub user_uid: Uuid,

    /// Notification kind, e.g. `mention`
    pub notification_type: String,

    /// Human-readable content
    pub content: String,

    /// Whether the user has read it
    pub is_read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    /// User the notification belongs to
    pub user_uid: Uuid,

    /// Notification kind
    pub notification_type: String,

    /// Human-readable content
    pub content: String,
}

impl Notification {
    /// Creates a new unread notification
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (uid, user_uid, notification_type, content)
            VALUES ($1, $2, $3, $4)
            RETURNING uid, user_uid, notification_type, content, is_read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_uid)
        .bind(data.notification_type)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Lists a user's notifications, newest first
    pub async fn list_by_user(pool: &PgPool, user_uid: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT uid, user_uid, notification_type, content, is_read, created_at
            FROM notifications
            WHERE user_uid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_uid)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Marks one of a user's notifications as read
    ///
    /// Scoped by `user_uid` so a user cannot mark another user's
    /// notifications. Returns None if no matching row exists.
    pub async fn mark_read(
        pool: &PgPool,
        uid: Uuid,
        user_uid: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE uid = $1 AND user_uid = $2
            RETURNING uid, user_uid, notification_type, content, is_read, created_at
            "#,
        )
        .bind(uid)
        .bind(user_uid)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }
}
