/// Project discussion threads
///
/// - `GET    /v1/projects/:id/comments`: flat list in posting order
/// - `POST   /v1/projects/:id/comments`: new comment or reply (`parent_id`)
/// - `PATCH  /v1/comments/:id`: author only
/// - `DELETE /v1/comments/:id`: author or admin; replies go with it

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
    auth::{
        authorization::{require_owner_or_admin, require_profile, AuthzError},
        middleware::AuthContext,
    },
    models::comment::{Comment, CommentWithAuthor, CreateComment},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub body: String,

    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub body: String,
}

async fn find_comment(state: &AppState, id: Uuid) -> ApiResult<Comment> {
    Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    find_project(&state, project_id).await?;
    Ok(Json(Comment::list_by_project(&state.db, project_id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let author_id = require_profile(&auth)?;
    req.validate()?;
    find_project(&state, project_id).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            project_id,
            author_id,
            parent_id: req.parent_id,
            body: req.body,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => {
            ApiError::BadRequest("Parent comment does not belong to this project".to_string())
        }
        other => ApiError::from(other),
    })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let comment = find_comment(&state, id).await?;
    if auth.profile_id != Some(comment.author_id) {
        return Err(AuthzError::NotAuthorized.into());
    }
    req.validate()?;

    let comment = Comment::update_body(&state.db, id, &req.body)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let comment = find_comment(&state, id).await?;
    require_owner_or_admin(&auth, comment.author_id)?;

    Comment::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
