/// Employee directory
///
/// # Endpoints
///
/// - `GET    /v1/profiles`: search (q, department, status, page, per_page)
/// - `GET    /v1/profiles/:id`
/// - `PATCH  /v1/profiles/:id`: self-service fields (self or admin)
/// - `PUT    /v1/profiles/:id/github`: link a GitHub username (self or admin)
/// - `DELETE /v1/profiles/:id/github`: unlink it (self or admin)
/// - `GET    /v1/profiles/:id/github/activity`: events authored by that username
///
/// Warehouse-owned fields (names, department, job title) are only written by
/// the consolidation job.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use wizelabs_shared::{
    auth::{authorization::require_self_or_admin, middleware::AuthContext},
    models::{
        github::{GitHubActivity, GitHubProfile},
        profile::{EmployeeStatus, Profile, ProfileFilter, UpdateProfile},
        Pagination,
    },
};

#[derive(Debug, Deserialize)]
pub struct ListProfilesQuery {
    pub q: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub display_name: String,
    pub github_username: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Preferred name must be at most 100 characters"))]
    pub preferred_name: Option<String>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LinkGitHubRequest {
    #[validate(custom(function = "validate_github_username"))]
    pub username: String,
}

/// GitHub logins: 1-39 characters, alphanumerics and single inner hyphens
fn validate_github_username(username: &str) -> Result<(), ValidationError> {
    let valid = !username.is_empty()
        && username.len() <= 39
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--");

    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("github_username");
        error.message = Some("Invalid GitHub username".into());
        Err(error)
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

pub(crate) fn activity_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListProfilesQuery>,
) -> ApiResult<Json<Vec<Profile>>> {
    let filter = ProfileFilter {
        q: query.q,
        department: query.department,
        status: query.status,
    };
    let defaults = Pagination::default();
    let page = Pagination::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );

    Ok(Json(Profile::search(&state.db, &filter, page).await?))
}

async fn load(state: &AppState, id: Uuid) -> ApiResult<ProfileResponse> {
    let profile = Profile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile"))?;

    let github_username = GitHubProfile::find_by_profile(&state.db, id)
        .await?
        .map(|g| g.username);

    Ok(ProfileResponse {
        display_name: profile.display_name(),
        profile,
        github_username,
    })
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(load(&state, id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    require_self_or_admin(&auth, id)?;
    req.validate()?;

    Profile::update(
        &state.db,
        id,
        UpdateProfile {
            preferred_name: req.preferred_name,
            bio: req.bio,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Profile"))?;

    Ok(Json(load(&state, id).await?))
}

pub async fn link_github(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<LinkGitHubRequest>,
) -> ApiResult<Json<GitHubProfile>> {
    require_self_or_admin(&auth, id)?;
    req.validate()?;

    if Profile::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::not_found("Profile"));
    }

    let link = GitHubProfile::link(&state.db, id, &req.username).await?;
    tracing::info!(profile_id = %id, username = %link.username, "Linked GitHub account");

    Ok(Json(link))
}

pub async fn unlink_github(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_self_or_admin(&auth, id)?;

    if !GitHubProfile::unlink(&state.db, id).await? {
        return Err(ApiError::not_found("GitHub link"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Activity authored by the profile's linked GitHub user; empty when unlinked
pub async fn github_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<GitHubActivity>>> {
    let Some(link) = GitHubProfile::find_by_profile(&state.db, id).await? else {
        return Ok(Json(Vec::new()));
    };

    let activity =
        GitHubActivity::list_by_actor(&state.db, &link.username, activity_limit(query.limit)).await?;

    Ok(Json(activity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_username_rules() {
        for ok in ["octocat", "a", "ana-lopez", "A1b2"] {
            assert!(validate_github_username(ok).is_ok(), "{}", ok);
        }
        for bad in ["", "-ana", "ana-", "ana--lopez", "ana lopez", "ana_lopez", &"a".repeat(40)] {
            assert!(validate_github_username(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_activity_limit_is_clamped() {
        assert_eq!(activity_limit(None), 50);
        assert_eq!(activity_limit(Some(0)), 1);
        assert_eq!(activity_limit(Some(10_000)), 200);
    }
}
