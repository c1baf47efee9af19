/// Project stages and stage tasks
///
/// - `GET    /v1/projects/:id/stages`: stages in order, each with its tasks
/// - `POST   /v1/projects/:id/stages`: editors
/// - `DELETE /v1/stages/:id`: editors; removes the stage's tasks too
/// - `POST   /v1/stages/:id/tasks`: editors
/// - `PATCH  /v1/tasks/:id`: editors (text, completion, assignee)
/// - `DELETE /v1/tasks/:id`: editors

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
    models::stage::{ProjectStage, StageTask, StageWithTasks, UpdateStageTask},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStageRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Appended after the last stage when omitted
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,

    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
    pub assignee_id: Option<Uuid>,
}

async fn find_stage(state: &AppState, id: Uuid) -> ApiResult<ProjectStage> {
    ProjectStage::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Stage"))
}

async fn task_project(state: &AppState, task_id: Uuid) -> ApiResult<Uuid> {
    StageTask::project_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

pub async fn list_stages(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StageWithTasks>>> {
    find_project(&state, project_id).await?;
    Ok(Json(ProjectStage::list_with_tasks(&state.db, project_id).await?))
}

pub async fn create_stage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateStageRequest>,
) -> ApiResult<(StatusCode, Json<ProjectStage>)> {
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    let stage = ProjectStage::create(&state.db, project_id, &req.name, req.position).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

pub async fn delete_stage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let stage = find_stage(&state, id).await?;
    require_editor(&state.db, &auth, stage.project_id).await?;

    ProjectStage::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(stage_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<StageTask>)> {
    let stage = find_stage(&state, stage_id).await?;
    require_editor(&state.db, &auth, stage.project_id).await?;
    req.validate()?;

    let task = StageTask::create(&state.db, stage_id, &req.description, req.assignee_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<StageTask>> {
    let project_id = task_project(&state, id).await?;
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    let task = StageTask::update(
        &state.db,
        id,
        UpdateStageTask {
            description: req.description,
            completed: req.completed,
            assignee_id: req.assignee_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Task"))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project_id = task_project(&state, id).await?;
    require_editor(&state.db, &auth, project_id).await?;

    StageTask::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
