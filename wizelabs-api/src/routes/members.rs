/// Project membership endpoints (editors only for writes)
///
/// - `GET    /v1/projects/:id/members`
/// - `POST   /v1/projects/:id/members`: add or reactivate a member
/// - `PATCH  /v1/projects/:id/members/:profile_id`
/// - `DELETE /v1/projects/:id/members/:profile_id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_project,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use wizelabs_shared::{
    auth::{authorization::require_editor, middleware::AuthContext},
    models::{
        profile::Profile,
        project_member::{AddMember, MemberWithProfile, ProjectMember, UpdateMember},
    },
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    pub profile_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Role must be 1-100 characters"))]
    pub role: Option<String>,

    #[validate(range(min = 0, max = 80, message = "Hours per week must be between 0 and 80"))]
    pub hours_per_week: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "Role must be 1-100 characters"))]
    pub role: Option<String>,

    #[validate(range(min = 0, max = 80, message = "Hours per week must be between 0 and 80"))]
    pub hours_per_week: Option<i32>,

    pub active: Option<bool>,
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberWithProfile>>> {
    find_project(&state, project_id).await?;
    Ok(Json(ProjectMember::list_by_project(&state.db, project_id).await?))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    if Profile::find_by_id(&state.db, req.profile_id).await?.is_none() {
        return Err(ApiError::not_found("Profile"));
    }

    let member = ProjectMember::upsert(
        &state.db,
        AddMember {
            project_id,
            profile_id: req.profile_id,
            role: req.role.unwrap_or_else(|| "Contributor".to_string()),
            hours_per_week: req.hours_per_week,
        },
    )
    .await?;

    tracing::info!(%project_id, profile_id = %req.profile_id, role = %member.role, "Member added");

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, profile_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Json<ProjectMember>> {
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    let member = ProjectMember::update(
        &state.db,
        project_id,
        profile_id,
        UpdateMember {
            role: req.role,
            hours_per_week: req.hours_per_week,
            active: req.active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Member"))?;

    Ok(Json(member))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, profile_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_editor(&state.db, &auth, project_id).await?;

    let project = find_project(&state, project_id).await?;
    if project.owner_id == profile_id {
        return Err(ApiError::Conflict("The project owner cannot be removed".to_string()));
    }

    if !ProjectMember::remove(&state.db, project_id, profile_id).await? {
        return Err(ApiError::not_found("Member"));
    }

    Ok(StatusCode::NO_CONTENT)
}
