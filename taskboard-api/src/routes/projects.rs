/// Project endpoints
///
/// # Endpoints
///
/// - `POST /api/projects` - Create a project
/// - `GET /api/projects` - List projects
/// - `GET /api/projects/:project_uid` - Fetch one project
/// - `GET /api/projects/:project_uid/tasks` - List a project's tasks
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use taskboard_shared::{
    auth::middleware::AuthUser,
    models::{
        project::{CreateProject, Project},
        task::Task,
    },
};
use uuid::Uuid;

/// Create project request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project title
    pub title: Option<String>,

    /// Project description
    pub description: Option<String>,

    /// Due date
    pub due_date: Option<String>,

    /// Priority string
    pub priority: Option<String>,

    /// Optional milestones payload
    pub milestones: Option<JsonValue>,
}

/// Create project handler
///
/// The project is linked to the authenticated user and starts in
/// `active` status.
///
/// # Endpoint
///
/// ```text
/// POST /api/projects
/// Authorization: Bearer <token>
///
/// {"title": "Launch", "description": "Product launch",
///  "due_date": "2025-01-01", "priority": "High"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields
/// - `401/403`: Missing or invalid token
/// - `500 Internal Server Error`: Store failure
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let mut missing = Vec::new();
    if req.title.as_deref().map_or(true, str::is_empty) {
        missing.push("title");
    }
    if req.description.as_deref().map_or(true, str::is_empty) {
        missing.push("description");
    }
    if req.due_date.as_deref().map_or(true, str::is_empty) {
        missing.push("due_date");
    }
    if req.priority.as_deref().map_or(true, str::is_empty) {
        missing.push("priority");
    }
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(missing));
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            title: req.title.unwrap(),
            description: req.description.unwrap(),
            due_date: req.due_date.unwrap(),
            priority: req.priority.unwrap(),
            milestones: req.milestones,
            created_by: auth.uid,
        },
    )
    .await?;

    tracing::info!(project_uid = %project.uid, user_uid = %auth.uid, "Created project");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Lists all projects, newest first
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list(&state.db).await?;

    Ok(Json(projects))
}

/// Fetches a single project
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_uid): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = Project::find_by_uid(&state.db, project_uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Lists a project's tasks, newest first
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_uid): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    // Distinguish an unknown project from one with no tasks.
    Project::find_by_uid(&state.db, project_uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project_uid).await?;

    Ok(Json(tasks))
}
