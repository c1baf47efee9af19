/// Project objectives
///
/// - `GET    /v1/projects/:id/objectives`
/// - `POST   /v1/projects/:id/objectives`: editors
/// - `PATCH  /v1/objectives/:id`: editors (text or completion)
/// - `DELETE /v1/objectives/:id`: editors

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
    models::objective::{Objective, UpdateObjective},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateObjectiveRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateObjectiveRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

async fn find_objective(state: &AppState, id: Uuid) -> ApiResult<Objective> {
    Objective::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Objective"))
}

pub async fn list_objectives(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Objective>>> {
    find_project(&state, project_id).await?;
    Ok(Json(Objective::list_by_project(&state.db, project_id).await?))
}

pub async fn create_objective(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateObjectiveRequest>,
) -> ApiResult<(StatusCode, Json<Objective>)> {
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    let objective = Objective::create(&state.db, project_id, &req.description).await?;
    Ok((StatusCode::CREATED, Json(objective)))
}

pub async fn update_objective(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateObjectiveRequest>,
) -> ApiResult<Json<Objective>> {
    let objective = find_objective(&state, id).await?;
    require_editor(&state.db, &auth, objective.project_id).await?;
    req.validate()?;

    let objective = Objective::update(
        &state.db,
        id,
        UpdateObjective {
            description: req.description,
            completed: req.completed,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Objective"))?;

    Ok(Json(objective))
}

pub async fn delete_objective(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let objective = find_objective(&state, id).await?;
    require_editor(&state.db, &auth, objective.project_id).await?;

    Objective::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
