/// Task endpoints
///
/// This is the event-emitting path: a status update writes the task row
/// and its audit entry in one transaction, then publishes
/// `task_status_updated`; a new comment publishes `new_comment_added` and
/// creates a notification (plus `notification_created` event) for every
/// mentioned user. Events are published only after the write commits, so
/// a subscriber never observes an event for state that was rolled back.
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task
/// - `PATCH /api/tasks/:task_uid/status` - Move a task across the board
/// - `POST /api/tasks/:task_uid/comments` - Comment on a task
/// - `GET /api/tasks/:task_uid/comments` - List a task's comments
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
    events::{NewCommentAdded, RealtimeEvent, TaskStatusUpdated, Topic},
    models::{
        comment::{Comment, CreateComment},
        notification::{CreateNotification, Notification},
        project::Project,
        task::{CreateTask, Task},
    },
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Project the task belongs to
    pub project_uid: Option<Uuid>,

    /// Task title
    pub title: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<String>,

    /// Optional priority
    pub priority: Option<String>,

    /// Initial status (defaults to `to_do`)
    pub status: Option<String>,
}

/// Update task status request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status string
    pub status: Option<String>,
}

/// Add comment request
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    /// Comment body
    pub content: Option<String>,

    /// Optional list of mentioned user ids
    pub mentions: Option<JsonValue>,
}

/// Create task handler
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields or unknown project
/// - `500 Internal Server Error`: Store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let mut missing = Vec::new();
    if req.project_uid.is_none() {
        missing.push("project_uid");
    }
    if req.title.as_deref().map_or(true, str::is_empty) {
        missing.push("title");
    }
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(missing));
    }

    let project_uid = req.project_uid.unwrap();

    Project::find_by_uid(&state.db, project_uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_uid,
            title: req.title.unwrap(),
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            status: req.status,
            created_by: auth.uid,
        },
    )
    .await?;

    tracing::info!(task_uid = %task.uid, project_uid = %project_uid, "Created task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update task status handler
///
/// Writes the new status and its audit entry in one transaction, then
/// publishes `task_status_updated` to the task's and project's topics.
///
/// # Endpoint
///
/// ```text
/// PATCH /api/tasks/:task_uid/status
/// Authorization: Bearer <token>
///
/// {"status": "in_progress"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing status or unknown task
/// - `500 Internal Server Error`: Store failure
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_uid): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Task>> {
    let Some(status) = req.status.filter(|s| !s.is_empty()) else {
        return Err(ApiError::missing_fields(vec!["status"]));
    };

    let task = Task::update_status(&state.db, task_uid, &status, auth.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(
        task_uid = %task.uid,
        status = %task.status,
        user_uid = %auth.uid,
        "Updated task status"
    );

    let event = TaskStatusUpdated {
        task_uid: task.uid,
        status: task.status.clone(),
        updated_at: task.updated_at,
    };
    state.events.publish(
        Topic::Task(task.uid),
        RealtimeEvent::TaskStatusUpdated(event.clone()),
    );
    state.events.publish(
        Topic::Project(task.project_uid),
        RealtimeEvent::TaskStatusUpdated(event),
    );

    Ok(Json(task))
}

/// Add comment handler
///
/// Inserts the comment, publishes `new_comment_added` on the task's
/// topic, and creates a notification row (with a `notification_created`
/// event on the recipient's topic) for every mentioned user.
///
/// # Errors
///
/// - `400 Bad Request`: Missing content or unknown task
/// - `500 Internal Server Error`: Store failure
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_uid): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let Some(content) = req.content.filter(|c| !c.is_empty()) else {
        return Err(ApiError::missing_fields(vec!["content"]));
    };

    let task = Task::find_by_uid(&state.db, task_uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_uid,
            user_uid: auth.uid,
            content,
            mentions: req.mentions,
        },
    )
    .await?;

    tracing::info!(comment_uid = %comment.uid, task_uid = %task_uid, "Added comment");

    state.events.publish(
        Topic::Task(task_uid),
        RealtimeEvent::NewCommentAdded(NewCommentAdded {
            comment_uid: comment.uid,
            task_uid: comment.task_uid,
            user_uid: comment.user_uid,
            content: comment.content.clone(),
            created_at: comment.created_at,
        }),
    );

    // One notification per mentioned user, each pushed to that user's
    // topic. A failed notification write fails the request after the
    // comment exists; the comment itself is never rolled back.
    for mentioned_uid in comment.mentioned_users() {
        let notification = Notification::create(
            &state.db,
            CreateNotification {
                user_uid: mentioned_uid,
                notification_type: "mention".to_string(),
                content: format!("You were mentioned in a comment on \"{}\"", task.title),
            },
        )
        .await?;

        state.events.publish(
            Topic::User(mentioned_uid),
            RealtimeEvent::NotificationCreated(notification),
        );
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Lists a task's comments, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_uid): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    Task::find_by_uid(&state.db, task_uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comments = Comment::list_by_task(&state.db, task_uid).await?;

    Ok(Json(comments))
}
