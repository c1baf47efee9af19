/// Project votes
///
/// - `POST /v1/projects/:id/votes`: toggle the caller's vote
/// - `GET  /v1/projects/:id/votes`: vote count and whether the caller voted

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::find_project,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use wizelabs_shared::{
    auth::{authorization::require_profile, middleware::AuthContext},
    models::vote::{Vote, VoteState},
};

pub async fn toggle_vote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<VoteState>> {
    let profile_id = require_profile(&auth)?;

    let project = find_project(&state, project_id).await?;
    if project.is_archived {
        return Err(ApiError::Conflict("Archived projects cannot be voted on".to_string()));
    }

    let vote = Vote::toggle(&state.db, project_id, profile_id).await?;
    tracing::debug!(%project_id, %profile_id, voted = vote.voted, count = vote.count, "Vote toggled");

    Ok(Json(vote))
}

pub async fn get_votes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<VoteState>> {
    let profile_id = require_profile(&auth)?;
    find_project(&state, project_id).await?;

    Ok(Json(Vote::state(&state.db, project_id, profile_id).await?))
}
