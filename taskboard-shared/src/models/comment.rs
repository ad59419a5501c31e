/// Comment model
///
/// Comments are immutable once created. The optional `mentions` list
/// names users who should be notified about the comment.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Comment on a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment id
    pub uid: Uuid,

    /// Task the comment was left on
    pub task_uid: Uuid,

    /// Author
    pub user_uid: Uuid,

    /// Comment body
    pub content: String,

    /// Optional list of mentioned user ids
    pub mentions: Option<JsonValue>,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Task the comment is left on
    pub task_uid: Uuid,

    /// Author
    pub user_uid: Uuid,

    /// Comment body
    pub content: String,

    /// Optional list of mentioned user ids
    pub mentions: Option<JsonValue>,
}

impl Comment {
    /// Creates a new comment
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (uid, task_uid, user_uid, content, mentions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING uid, task_uid, user_uid, content, mentions, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.task_uid)
        .bind(data.user_uid)
        .bind(data.content)
        .bind(data.mentions)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists comments for a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_uid: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT uid, task_uid, user_uid, content, mentions, created_at
            FROM comments
            WHERE task_uid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(task_uid)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Extracts mentioned user ids from the mentions payload
    ///
    /// The payload is a JSON array of user id strings; anything that does
    /// not parse as a UUID is skipped.
    pub fn mentioned_users(&self) -> Vec<Uuid> {
        mentioned_users(self.mentions.as_ref())
    }
}

/// Parses a mentions payload into user ids
pub fn mentioned_users(mentions: Option<&JsonValue>) -> Vec<Uuid> {
    mentions
        .and_then(|m| m.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| Uuid::parse_str(s).ok())
                .collect()
        })
        .unwrap_or_default()
}
