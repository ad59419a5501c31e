/// Project model and database operations
///
/// Projects group tasks and are owned by the user who created them. A new
/// project always starts in `active` status.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     uid UUID PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     due_date TEXT NOT NULL,
///     priority TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'active',
///     milestones JSONB,
///     created_by UUID NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Status assigned to every newly created project
pub const DEFAULT_PROJECT_STATUS: &str = "active";

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project id
    pub uid: Uuid,

    /// Project title
    pub title: String,

    /// Project description
    pub description: String,

    /// Due date as provided by the client (free-form date string)
    pub due_date: String,

    /// Priority string (`High`, `Medium`, `Low` by convention)
    pub priority: String,

    /// Lifecycle status, `active` at creation
    pub status: String,

    /// Optional milestones payload (client-defined structure)
    pub milestones: Option<JsonValue>,

    /// User who created the project
    pub created_by: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project title
    pub title: String,

    /// Project description
    pub description: String,

    /// Due date
    pub due_date: String,

    /// Priority string
    pub priority: String,

    /// Optional milestones payload
    pub milestones: Option<JsonValue>,

    /// User who created the project
    pub created_by: Uuid,
}

impl Project {
    /// Creates a new project in `active` status
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (uid, title, description, due_date, priority, status, milestones, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING uid, title, description, due_date, priority, status, milestones,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(DEFAULT_PROJECT_STATUS)
        .bind(data.milestones)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by id
    pub async fn find_by_uid(pool: &PgPool, uid: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT uid, title, description, due_date, priority, status, milestones,
                   created_by, created_at, updated_at
            FROM projects
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT uid, title, description, due_date, priority, status, milestones,
                   created_by, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}
