/// Administrator grants (admin only)
///
/// - `GET    /v1/admins`
/// - `POST   /v1/admins`: `{"email": "..."}`; the user must have logged in once
/// - `DELETE /v1/admins/:user_id`: revoke; the role falls back to what the
///   email domain maps to. Admins cannot revoke themselves.
///
/// Grants take effect on the user's next login or token refresh. The caller's
/// own admin role is re-read from the database on every call here, so a
/// revoked admin cannot use a still-valid token to manage roles.

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
    auth::{
        authorization::{require_admin, require_current_admin},
        middleware::AuthContext,
    },
    models::{
        profile::Profile,
        user::{User, UserRole},
    },
};

#[derive(Debug, Deserialize, Validate)]
pub struct GrantAdminRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

pub async fn list_admins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    require_current_admin(&state.db, &auth).await?;
    Ok(Json(User::list_by_role(&state.db, UserRole::Admin).await?))
}

pub async fn grant_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<GrantAdminRequest>,
) -> ApiResult<Json<User>> {
    require_admin(&auth)?;
    req.validate()?;
    require_current_admin(&state.db, &auth).await?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user has logged in with that email".to_string()))?;

    let user = User::update_role(&state.db, user.id, UserRole::Admin)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    // Admins need a profile to vote, comment and own projects
    let (first_name, last_name) = match user.name.as_deref().and_then(|n| n.split_once(' ')) {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (user.name.clone().unwrap_or_default(), String::new()),
    };
    Profile::ensure_exists(&state.db, &user.email, &first_name, &last_name, None).await?;

    tracing::warn!(user_id = %user.id, granted_by = %auth.user_id, "Admin role granted");

    Ok(Json(user))
}

pub async fn revoke_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    if user_id == auth.user_id {
        return Err(ApiError::Forbidden("Admins cannot revoke their own role".to_string()));
    }
    require_current_admin(&state.db, &auth).await?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    if !user.role.is_admin() {
        return Err(ApiError::NotFound("User is not an admin".to_string()));
    }

    let role = state.config.role_policy().role_for_email(&user.email);
    User::update_role(&state.db, user_id, role).await?;

    tracing::warn!(%user_id, revoked_by = %auth.user_id, new_role = %role, "Admin role revoked");

    Ok(StatusCode::NO_CONTENT)
}
