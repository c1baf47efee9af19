/// Project resources
///
/// - `GET    /v1/projects/:id/resources`
/// - `POST   /v1/projects/:id/resources`: editors
/// - `DELETE /v1/resources/:id`: editors of the owning project

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
    models::resource::{CreateResource, Resource},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 50, message = "Type must be 1-50 characters"))]
    pub resource_type: String,

    #[validate(length(min = 1, max = 100, message = "Provider must be 1-100 characters"))]
    pub provider: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
}

pub async fn list_resources(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Resource>>> {
    find_project(&state, project_id).await?;
    Ok(Json(Resource::list_by_project(&state.db, project_id).await?))
}

pub async fn create_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    require_editor(&state.db, &auth, project_id).await?;
    req.validate()?;

    let resource = Resource::create(
        &state.db,
        CreateResource {
            project_id,
            resource_type: req.resource_type,
            provider: req.provider,
            name: req.name,
            url: req.url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let resource = Resource::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Resource"))?;
    require_editor(&state.db, &auth, resource.project_id).await?;

    Resource::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
