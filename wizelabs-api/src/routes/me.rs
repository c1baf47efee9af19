/// `GET /v1/me`: the signed-in user, their profile and their projects

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use wizelabs_shared::{
    auth::middleware::AuthContext,
    models::{
        github::GitHubProfile,
        profile::Profile,
        project::Project,
        user::User,
    },
};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub profile: Option<Profile>,
    pub github_username: Option<String>,
    pub projects: Vec<Project>,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let (profile, github_username, projects) = match auth.profile_id {
        Some(profile_id) => (
            Profile::find_by_id(&state.db, profile_id).await?,
            GitHubProfile::find_by_profile(&state.db, profile_id)
                .await?
                .map(|g| g.username),
            Project::list_for_profile(&state.db, profile_id).await?,
        ),
        None => (None, None, Vec::new()),
    };

    Ok(Json(MeResponse {
        user,
        profile,
        github_username,
        projects,
    }))
}
