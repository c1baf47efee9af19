/// Project endpoints
///
/// # Endpoints
///
/// - `GET    /v1/projects`: filtered listing, most voted first
/// - `POST   /v1/projects`: propose a project; the caller becomes its owner
/// - `GET    /v1/projects/:id`: project with labels, members and votes
/// - `PATCH  /v1/projects/:id`: editors only; `"tier_id": null` clears the tier
/// - `DELETE /v1/projects/:id`: archives (owner or admin);
///   `?permanent=true` deletes for good (admin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;
use wizelabs_shared::{
    auth::{
        authorization::{require_admin, require_editor, require_owner_or_admin, require_profile},
        middleware::AuthContext,
    },
    models::{
        label::Label,
        project::{CreateProject, Project, ProjectFilter, ProjectSummary, UpdateProject},
        project_member::{MemberWithProfile, ProjectMember},
        project_status::ProjectStatus,
        vote::{Vote, VoteState},
        Pagination,
    },
};

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub q: Option<String>,
    pub status_id: Option<Uuid>,
    pub tier_id: Option<Uuid>,
    pub label_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub include_archived: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 10000, message = "Description must be 1-10000 characters"))]
    pub description: String,

    #[validate(length(max = 5000, message = "Value statement must be at most 5000 characters"))]
    pub value_statement: Option<String>,

    #[validate(length(max = 5000, message = "Target must be at most 5000 characters"))]
    pub target: Option<String>,

    /// Defaults to the first status in the workflow
    pub status_id: Option<Uuid>,

    pub tier_id: Option<Uuid>,

    #[validate(length(max = 255, message = "Slack channel must be at most 255 characters"))]
    pub slack_channel: Option<String>,

    #[serde(default)]
    pub label_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Description must be 1-10000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 5000, message = "Value statement must be at most 5000 characters"))]
    pub value_statement: Option<String>,

    #[validate(length(max = 5000, message = "Target must be at most 5000 characters"))]
    pub target: Option<String>,

    pub status_id: Option<Uuid>,

    /// Absent keeps the tier, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub tier_id: Option<Option<Uuid>>,

    #[validate(length(max = 255, message = "Slack channel must be at most 255 characters"))]
    pub slack_channel: Option<String>,

    /// Replaces the label set when present
    pub label_ids: Option<Vec<Uuid>>,
}

/// Wraps any value that is present in the body, `null` included
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteProjectQuery {
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub labels: Vec<Label>,
    pub members: Vec<MemberWithProfile>,
    pub votes: VoteState,
    pub can_edit: bool,
}

/// Loads a project or answers 404
pub(crate) async fn find_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let filter = ProjectFilter {
        q: query.q,
        status_id: query.status_id,
        tier_id: query.tier_id,
        label_id: query.label_id,
        owner_id: query.owner_id,
        include_archived: query.include_archived,
    };
    let defaults = Pagination::default();
    let page = Pagination::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );

    Ok(Json(Project::search(&state.db, &filter, page).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let owner_id = require_profile(&auth)?;
    req.validate()?;

    let status_id = match req.status_id {
        Some(id) => id,
        None => {
            ProjectStatus::first(&state.db)
                .await?
                .ok_or_else(|| ApiError::Conflict("No project statuses are configured".to_string()))?
                .id
        }
    };

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            value_statement: req.value_statement,
            target: req.target,
            owner_id,
            status_id,
            tier_id: req.tier_id,
            slack_channel: req.slack_channel,
            label_ids: req.label_ids,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, owner_id = %owner_id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let project = find_project(&state, id).await?;

    let labels = Label::list_for_project(&state.db, id).await?;
    let members = ProjectMember::list_by_project(&state.db, id).await?;

    let (votes, can_edit) = match auth.profile_id {
        Some(profile_id) => (
            Vote::state(&state.db, id, profile_id).await?,
            auth.is_admin() || Project::is_editor(&state.db, id, profile_id).await?,
        ),
        None => (
            VoteState {
                voted: false,
                count: Vote::count_by_project(&state.db, id).await?,
            },
            auth.is_admin(),
        ),
    };

    Ok(Json(ProjectDetail {
        project,
        labels,
        members,
        votes,
        can_edit,
    }))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    require_editor(&state.db, &auth, id).await?;
    req.validate()?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            value_statement: req.value_statement,
            target: req.target,
            status_id: req.status_id,
            tier_id: req.tier_id,
            slack_channel: req.slack_channel,
            label_ids: req.label_ids,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Project"))?;

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteProjectQuery>,
) -> ApiResult<StatusCode> {
    let project = find_project(&state, id).await?;
    require_owner_or_admin(&auth, project.owner_id)?;

    if query.permanent {
        require_admin(&auth)?;
        Project::delete(&state.db, id).await?;
        tracing::warn!(project_id = %id, user_id = %auth.user_id, "Project permanently deleted");
    } else {
        Project::set_archived(&state.db, id, true).await?;
        tracing::info!(project_id = %id, "Project archived");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(body: serde_json::Value) -> UpdateProjectRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_tier_absent_null_and_set_are_distinct() {
        assert_eq!(update(json!({"name": "Renamed"})).tier_id, None);
        assert_eq!(update(json!({"tier_id": null})).tier_id, Some(None));

        let tier = Uuid::new_v4();
        assert_eq!(update(json!({"tier_id": tier})).tier_id, Some(Some(tier)));
    }

    #[test]
    fn test_malformed_tier_is_rejected() {
        assert!(serde_json::from_value::<UpdateProjectRequest>(json!({"tier_id": "gold"})).is_err());
    }
}
