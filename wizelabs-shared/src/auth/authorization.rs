/// Authorization checks
///
/// Wizelabs has two layers of permission:
///
/// 1. **Role**: `admin` can do everything; `user` and `intern` act through
///    their profile; `applicant` has no profile and only sees its own
///    application.
/// 2. **Project editors**: the owner and active members of a project may
///    change it. Admins are editors of every project.
///
/// Checks that only need the token are plain functions; the editor check
/// and [`require_current_admin`] need the database.
///
/// # Example
///
/// ```no_run
/// use wizelabs_shared::auth::authorization::{require_editor, AuthzError};
/// use wizelabs_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn rename(pool: &PgPool, auth: &AuthContext, project_id: Uuid) -> Result<(), AuthzError> {
///     require_editor(pool, auth, project_id).await?;
///     // ... update the project
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::project::Project;
use crate::models::user::User;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Admin role required")]
    AdminRequired,

    /// Caller has no profile (applicants)
    #[error("An employee profile is required")]
    ProfileRequired,

    #[error("Only project editors can do this")]
    NotEditor,

    #[error("Not authorized to access this resource")]
    NotAuthorized,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}

/// Admin check against the stored role instead of the token claim
///
/// A revoked admin keeps the admin claim until the access token expires;
/// role management goes through this check so such a token cannot grant
/// the role back.
pub async fn require_current_admin(pool: &PgPool, auth: &AuthContext) -> Result<(), AuthzError> {
    require_admin(auth)?;

    match User::find_by_id(pool, auth.user_id).await? {
        Some(user) if user.role.is_admin() => Ok(()),
        _ => {
            tracing::warn!(user_id = %auth.user_id, "Admin claim no longer matches stored role");
            Err(AuthzError::AdminRequired)
        }
    }
}

/// Returns the caller's profile id
pub fn require_profile(auth: &AuthContext) -> Result<Uuid, AuthzError> {
    auth.profile_id.ok_or(AuthzError::ProfileRequired)
}

/// Allows the profile itself, or an admin
pub fn require_self_or_admin(auth: &AuthContext, profile_id: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin() || auth.profile_id == Some(profile_id) {
        return Ok(());
    }

    Err(AuthzError::NotAuthorized)
}

/// Same rule as [`require_self_or_admin`], named for resource owners
/// (project owner, comment author)
pub fn require_owner_or_admin(auth: &AuthContext, owner_profile_id: Uuid) -> Result<(), AuthzError> {
    require_self_or_admin(auth, owner_profile_id)
}

/// Allows admins, the project owner and active project members
pub async fn require_editor(
    pool: &PgPool,
    auth: &AuthContext,
    project_id: Uuid,
) -> Result<(), AuthzError> {
    if auth.is_admin() {
        return Ok(());
    }

    let profile_id = require_profile(auth)?;

    if !Project::is_editor(pool, project_id, profile_id).await? {
        return Err(AuthzError::NotEditor);
    }

    Ok(())
}
