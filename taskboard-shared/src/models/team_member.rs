/// Team member model
///
/// The team roster managed on the team page. Entries are display records
/// (name, role, avatar) and are not linked to login accounts.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Team roster entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Unique member id
    pub uid: Uuid,

    /// Display name
    pub name: String,

    /// Role string (`Member`, `Manager`, ... free-form)
    pub role: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamMember {
    /// Display name
    pub name: String,

    /// Role string
    pub role: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Input for updating a member
///
/// All fields optional; only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeamMember {
    /// New display name
    pub name: Option<String>,

    /// New role string
    pub role: Option<String>,

    /// New avatar URL
    pub avatar_url: Option<String>,
}

impl TeamMember {
    /// Adds a member to the roster
    pub async fn create(pool: &PgPool, data: CreateTeamMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (uid, name, role, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING uid, name, role, avatar_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.role)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Lists the roster, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT uid, name, role, avatar_url, created_at, updated_at
            FROM team_members
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Updates a member's fields
    ///
    /// Returns None if the member does not exist.
    pub async fn update(
        pool: &PgPool,
        uid: Uuid,
        data: UpdateTeamMember,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE team_members SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }

        query.push_str(
            " WHERE uid = $1 RETURNING uid, name, role, avatar_url, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, TeamMember>(&query).bind(uid);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }

        let member = q.fetch_optional(pool).await?;

        Ok(member)
    }

    /// Removes a member from the roster
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, uid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE uid = $1")
            .bind(uid)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
