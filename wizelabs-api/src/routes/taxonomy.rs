/// Project taxonomy: labels, workflow statuses and innovation tiers
///
/// Everyone can read; only admins write. Deleting an entry still referenced
/// by a project answers `409 Conflict`.
///
/// | Resource | Routes |
/// |----------|--------|
/// | labels   | `GET/POST /v1/labels`, `PATCH/DELETE /v1/labels/:id` |
/// | statuses | `GET/POST /v1/statuses`, `PATCH/DELETE /v1/statuses/:id` |
/// | tiers    | `GET/POST /v1/tiers`, `PATCH/DELETE /v1/tiers/:id` |

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
use uuid::Uuid;
use validator::Validate;
use wizelabs_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        innovation_tier::{CreateInnovationTier, InnovationTier, UpdateInnovationTier},
        label::Label,
        project_status::{ProjectStatus, UpdateProjectStatus},
    },
};

#[derive(Debug, Deserialize, Validate)]
pub struct LabelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStatusRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTierRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub goals: String,

    #[serde(default)]
    pub requisites: String,

    #[serde(default)]
    pub benefits: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTierRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub goals: Option<String>,
    pub requisites: Option<String>,
    pub benefits: Option<String>,
}

fn deleted(found: bool, what: &str) -> ApiResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(what))
    }
}

// Labels

pub async fn list_labels(State(state): State<AppState>) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(Label::list(&state.db).await?))
}

pub async fn create_label(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<LabelRequest>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    require_admin(&auth)?;
    req.validate()?;

    Ok((StatusCode::CREATED, Json(Label::create(&state.db, &req.name).await?)))
}

pub async fn rename_label(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<LabelRequest>,
) -> ApiResult<Json<Label>> {
    require_admin(&auth)?;
    req.validate()?;

    Label::rename(&state.db, id, &req.name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Label"))
}

pub async fn delete_label(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;
    deleted(Label::delete(&state.db, id).await?, "Label")
}

// Statuses

pub async fn list_statuses(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectStatus>>> {
    Ok(Json(ProjectStatus::list(&state.db).await?))
}

pub async fn create_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateStatusRequest>,
) -> ApiResult<(StatusCode, Json<ProjectStatus>)> {
    require_admin(&auth)?;
    req.validate()?;

    let status = ProjectStatus::create(&state.db, &req.name, req.position).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ProjectStatus>> {
    require_admin(&auth)?;
    req.validate()?;

    ProjectStatus::update(
        &state.db,
        id,
        UpdateProjectStatus {
            name: req.name,
            position: req.position,
        },
    )
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Status"))
}

pub async fn delete_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;
    deleted(ProjectStatus::delete(&state.db, id).await?, "Status")
}

// Innovation tiers

pub async fn list_tiers(State(state): State<AppState>) -> ApiResult<Json<Vec<InnovationTier>>> {
    Ok(Json(InnovationTier::list(&state.db).await?))
}

pub async fn create_tier(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTierRequest>,
) -> ApiResult<(StatusCode, Json<InnovationTier>)> {
    require_admin(&auth)?;
    req.validate()?;

    let tier = InnovationTier::create(
        &state.db,
        CreateInnovationTier {
            name: req.name,
            goals: req.goals,
            requisites: req.requisites,
            benefits: req.benefits,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn update_tier(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTierRequest>,
) -> ApiResult<Json<InnovationTier>> {
    require_admin(&auth)?;
    req.validate()?;

    InnovationTier::update(
        &state.db,
        id,
        UpdateInnovationTier {
            name: req.name,
            goals: req.goals,
            requisites: req.requisites,
            benefits: req.benefits,
        },
    )
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Tier"))
}

pub async fn delete_tier(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;
    deleted(InnovationTier::delete(&state.db, id).await?, "Tier")
}
