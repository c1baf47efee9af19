/// GitHub repositories linked to projects, and what the worker ingested
///
/// - `GET    /v1/projects/:id/github`: linked repositories
/// - `POST   /v1/projects/:id/github`: link a repository (editors)
/// - `DELETE /v1/github/:id`: unlink (editors)
/// - `GET    /v1/projects/:id/github/activity?limit=`: newest events first
/// - `GET    /v1/projects/:id/github/releases?limit=`: newest releases first

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{profiles::activity_limit, projects::find_project},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use wizelabs_shared::{
    auth::{authorization::require_editor, middleware::AuthContext},
    models::github::{GitHubActivity, GitHubProject, GitHubRelease, RepoRef},
};

#[derive(Debug, Deserialize)]
pub struct LinkRepoRequest {
    pub repo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

pub async fn list_repos(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<GitHubProject>>> {
    find_project(&state, project_id).await?;
    Ok(Json(GitHubProject::list_by_project(&state.db, project_id).await?))
}

pub async fn link_repo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<LinkRepoRequest>,
) -> ApiResult<(StatusCode, Json<GitHubProject>)> {
    require_editor(&state.db, &auth, project_id).await?;

    let repo = RepoRef::parse(&req.repo_url).ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "repo_url".to_string(),
            message: "Expected a GitHub repository URL such as https://github.com/owner/repo"
                .to_string(),
        }])
    })?;

    let linked =
        GitHubProject::create(&state.db, project_id, &repo.html_url(), &repo.owner, &repo.repo)
            .await?;

    tracing::info!(%project_id, repo = %repo, "Linked GitHub repository");

    Ok((StatusCode::CREATED, Json(linked)))
}

pub async fn unlink_repo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let linked = GitHubProject::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Repository link"))?;
    require_editor(&state.db, &auth, linked.project_id).await?;

    GitHubProject::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn project_activity(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<GitHubActivity>>> {
    find_project(&state, project_id).await?;

    let activity =
        GitHubActivity::list_by_project(&state.db, project_id, activity_limit(query.limit)).await?;
    Ok(Json(activity))
}

pub async fn project_releases(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<GitHubRelease>>> {
    find_project(&state, project_id).await?;

    let releases =
        GitHubRelease::list_by_project(&state.db, project_id, activity_limit(query.limit)).await?;
    Ok(Json(releases))
}
