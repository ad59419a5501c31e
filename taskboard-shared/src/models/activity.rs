/// Activity feed model
///
/// Append-only audit trail of state-changing actions on tasks, separate
/// from the task table itself. Every task-status mutation appends exactly
/// one entry whose `details` records the prior and new status.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Action recorded for a task-status mutation
pub const ACTION_STATUS_UPDATED: &str = "updated_status";

/// `details` payload for a status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the mutation
    pub from: String,

    /// Status after the mutation
    pub to: String,
}

/// Activity feed entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityEntry {
    /// Unique entry id
    pub uid: Uuid,

    /// Task the action was performed on
    pub task_uid: Uuid,

    /// User who performed the action
    pub user_uid: Uuid,

    /// Action name, e.g. `updated_status`
    pub action: String,

    /// Structured action payload
    pub details: JsonValue,

    /// When the action happened
    pub created_at: DateTime<Utc>,
}

/// Input for appending a new entry
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// Task the action was performed on
    pub task_uid: Uuid,

    /// User who performed the action
    pub user_uid: Uuid,

    /// Action name
    pub action: String,

    /// Structured action payload
    pub details: JsonValue,
}

impl ActivityEntry {
    /// Appends an entry on an existing connection
    ///
    /// Takes a connection rather than the pool so callers can append
    /// inside the same transaction as the primary write.
    pub async fn insert(conn: &mut PgConnection, data: NewActivity) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, ActivityEntry>(
            r#"
            INSERT INTO activity_feed (uid, task_uid, user_uid, action, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING uid, task_uid, user_uid, action, details, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.task_uid)
        .bind(data.user_uid)
        .bind(data.action)
        .bind(data.details)
        .fetch_one(conn)
        .await?;

        Ok(entry)
    }

    /// Lists entries for a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_uid: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT uid, task_uid, user_uid, action, details, created_at
            FROM activity_feed
            WHERE task_uid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(task_uid)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_change_serialization() {
        let change = StatusChange {
            from: "to_do".to_string(),
            to: "in_progress".to_string(),
        };

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["from"], "to_do");
        assert_eq!(json["to"], "in_progress");
    }

    #[test]
    fn test_status_change_roundtrip() {
        let json = serde_json::json!({"from": "in_progress", "to": "done"});
        let change: StatusChange = serde_json::from_value(json).unwrap();
        assert_eq!(change.from, "in_progress");
        assert_eq!(change.to, "done");
    }
}
