/// Task model and database operations
///
/// Tasks live under a project and move across the board by status. The
/// status set is open-ended; `to_do`, `in_progress`, `done`, and
/// `completed` are the conventional values, and a new task starts in
/// `to_do` unless the creator says otherwise.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     uid UUID PRIMARY KEY,
///     project_uid UUID NOT NULL REFERENCES projects(uid) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     description TEXT,
///     due_date TEXT,
///     priority TEXT,
///     status TEXT NOT NULL DEFAULT 'to_do',
///     created_by UUID NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, CreateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_uid: Uuid, user_uid: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_uid,
///     title: "Write launch checklist".to_string(),
///     description: None,
///     due_date: None,
///     priority: Some("High".to_string()),
///     status: None,
///     created_by: user_uid,
/// }).await?;
///
/// // Move it across the board; the audit entry is written in the same
/// // transaction.
/// let updated = Task::update_status(&pool, task.uid, "in_progress", user_uid).await?;
/// assert_eq!(updated.unwrap().status, "in_progress");
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::activity::{ActivityEntry, NewActivity, StatusChange, ACTION_STATUS_UPDATED};

/// Status assigned to a new task when the creator does not specify one
pub const DEFAULT_TASK_STATUS: &str = "to_do";

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task id
    pub uid: Uuid,

    /// Project this task belongs to
    pub project_uid: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date (free-form date string)
    pub due_date: Option<String>,

    /// Optional priority string
    pub priority: Option<String>,

    /// Board status (open string set)
    pub status: String,

    /// User who created the task
    pub created_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Project this task belongs to
    pub project_uid: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<String>,

    /// Optional priority
    pub priority: Option<String>,

    /// Initial status (defaults to `to_do`)
    pub status: Option<String>,

    /// User who created the task
    pub created_by: Uuid,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (uid, project_uid, title, description, due_date, priority, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING uid, project_uid, title, description, due_date, priority, status,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.project_uid)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.status.unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()))
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id
    pub async fn find_by_uid(pool: &PgPool, uid: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT uid, project_uid, title, description, due_date, priority, status,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks for a project, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_uid: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT uid, project_uid, title, description, due_date, priority, status,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE project_uid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_uid)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task's status and appends the matching audit entry
    ///
    /// Both writes happen in a single transaction so the status change
    /// and its audit record commit or roll back together. The prior
    /// status is read under a row lock, so concurrent updates to the
    /// same task serialize here; the last committed write wins and each
    /// produces its own audit entry.
    ///
    /// Returns None if the task does not exist.
    pub async fn update_status(
        pool: &PgPool,
        task_uid: Uuid,
        new_status: &str,
        user_uid: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prior: Option<(String,)> =
            sqlx::query_as("SELECT status FROM tasks WHERE uid = $1 FOR UPDATE")
                .bind(task_uid)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((prior_status,)) = prior else {
            return Ok(None);
        };

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $1,
                updated_at = NOW()
            WHERE uid = $2
            RETURNING uid, project_uid, title, description, due_date, priority, status,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(new_status)
        .bind(task_uid)
        .fetch_one(&mut *tx)
        .await?;

        let details = serde_json::to_value(StatusChange {
            from: prior_status,
            to: new_status.to_string(),
        })
        .unwrap_or_default();

        ActivityEntry::insert(
            &mut tx,
            NewActivity {
                task_uid,
                user_uid,
                action: ACTION_STATUS_UPDATED.to_string(),
                details,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(Some(task))
    }
}
