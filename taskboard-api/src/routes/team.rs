/// Team roster endpoints
///
/// # Endpoints
///
/// - `GET /api/team/members` - List the roster
/// - `POST /api/team/members` - Add a member
/// - `PUT /api/team/members/:member_uid` - Update a member
/// - `DELETE /api/team/members/:member_uid` - Remove a member
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskboard_shared::models::team_member::{CreateTeamMember, TeamMember, UpdateTeamMember};
use uuid::Uuid;

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Display name
    pub name: Option<String>,

    /// Role string
    pub role: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Update member request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// New display name
    pub name: Option<String>,

    /// New role string
    pub role: Option<String>,

    /// New avatar URL
    pub avatar_url: Option<String>,
}

/// Lists the team roster
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    let members = TeamMember::list(&state.db).await?;

    Ok(Json(members))
}

/// Adds a member to the roster
///
/// # Errors
///
/// - `400 Bad Request`: Missing name or role
/// - `500 Internal Server Error`: Store failure
pub async fn add_member(
    State(state): State<AppState>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<TeamMember>)> {
    let mut missing = Vec::new();
    if req.name.as_deref().map_or(true, str::is_empty) {
        missing.push("name");
    }
    if req.role.as_deref().map_or(true, str::is_empty) {
        missing.push("role");
    }
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(missing));
    }

    let member = TeamMember::create(
        &state.db,
        CreateTeamMember {
            name: req.name.unwrap(),
            role: req.role.unwrap(),
            avatar_url: req.avatar_url,
        },
    )
    .await?;

    tracing::info!(member_uid = %member.uid, "Added team member");

    Ok((StatusCode::CREATED, Json(member)))
}

/// Updates a member's fields
pub async fn update_member(
    State(state): State<AppState>,
    Path(member_uid): Path<Uuid>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Json<TeamMember>> {
    let member = TeamMember::update(
        &state.db,
        member_uid,
        UpdateTeamMember {
            name: req.name,
            role: req.role,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Team member not found".to_string()))?;

    Ok(Json(member))
}

/// Removes a member from the roster
pub async fn remove_member(
    State(state): State<AppState>,
    Path(member_uid): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = TeamMember::delete(&state.db, member_uid).await?;

    if !deleted {
        return Err(ApiError::NotFound("Team member not found".to_string()));
    }

    tracing::info!(member_uid = %member_uid, "Removed team member");

    Ok(StatusCode::NO_CONTENT)
}
