/// User model and database operations
///
/// A user is a login identity created the first time someone signs in through
/// the identity provider. The role decides what the person can do:
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'user', 'intern', 'applicant');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     name VARCHAR(255),
///     role user_role NOT NULL DEFAULT 'applicant',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use wizelabs_shared::models::user::{CreateUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "jane.doe@wizeline.com".to_string(),
///     name: Some("Jane Doe".to_string()),
///     role: UserRole::User,
/// }).await?;
///
/// let admins = User::list_by_role(&pool, UserRole::Admin).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::normalize_email;

/// Access level of a signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Back-office access: taxonomy, admins, applicant pipeline
    Admin,

    /// Employee with a profile
    User,

    /// Intern with a profile
    Intern,

    /// External internship candidate
    Applicant,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Intern => "intern",
            UserRole::Applicant => "applicant",
        }
    }

    /// Roles backed by an employee profile
    pub fn has_profile(&self) -> bool {
        !matches!(self, UserRole::Applicant)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Normalized (lower-case) email
    pub email: String,

    pub name: Option<String>,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// None until the first completed login
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
}

const USER_COLUMNS: &str = "id, email, name, role, created_at, updated_at, last_login_at";

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the email is already registered.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(normalize_email(&data.email))
        .bind(data.name)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Looks a user up by email (normalized before comparison)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }

    /// Records a completed login and refreshes the display name
    pub async fn record_login(
        pool: &PgPool,
        id: Uuid,
        name: Option<&str>,
        role: UserRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = $3,
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    /// Changes a user's role; returns None if the user doesn't exist
    pub async fn update_role(
        pool: &PgPool,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY email ASC",
            USER_COLUMNS
        ))
        .bind(role)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_role(pool: &PgPool, role: UserRole) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::Intern.as_str(), "intern");
        assert_eq!(UserRole::Applicant.as_str(), "applicant");
        assert_eq!(UserRole::Intern.to_string(), "intern");
    }

    #[test]
    fn test_roles_with_profiles() {
        assert!(UserRole::Admin.has_profile());
        assert!(UserRole::User.has_profile());
        assert!(UserRole::Intern.has_profile());
        assert!(!UserRole::Applicant.has_profile());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        let json = serde_json::to_string(&UserRole::Applicant).unwrap();
        assert_eq!(json, "\"applicant\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
    }
}
