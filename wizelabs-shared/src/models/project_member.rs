/// Project membership
///
/// Many-to-many relationship between projects and profiles. A member has a
/// free-text role ("Owner", "Developer", "Designer", ...), an optional weekly
/// hour commitment, and an `active` flag; leaving a project flips the flag
/// rather than losing the history.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     profile_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     role VARCHAR(100) NOT NULL DEFAULT 'Contributor',
///     hours_per_week INTEGER,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, profile_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub profile_id: Uuid,
    pub role: String,
    pub hours_per_week: Option<i32>,
    pub active: bool,
    pub joined_at: DateTime<Utc>,
}

/// Member row joined with the profile fields the UI shows next to it
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberWithProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: ProjectMember,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMember {
    pub project_id: Uuid,
    pub profile_id: Uuid,
    pub role: String,
    pub hours_per_week: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    pub role: Option<String>,
    pub hours_per_week: Option<i32>,
    pub active: Option<bool>,
}

const MEMBER_COLUMNS: &str = "project_id, profile_id, role, hours_per_week, active, joined_at";

impl ProjectMember {
    /// Adds a member, or reactivates and updates an existing one
    pub async fn upsert(pool: &PgPool, data: AddMember) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(&format!(
            r#"
            INSERT INTO project_members (project_id, profile_id, role, hours_per_week)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (project_id, profile_id) DO UPDATE SET
                role = EXCLUDED.role,
                hours_per_week = EXCLUDED.hours_per_week,
                active = TRUE
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(data.project_id)
        .bind(data.profile_id)
        .bind(data.role.trim())
        .bind(data.hours_per_week)
        .fetch_one(pool)
        .await
    }

    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(&format!(
            "SELECT {} FROM project_members WHERE project_id = $1 AND profile_id = $2",
            MEMBER_COLUMNS
        ))
        .bind(project_id)
        .bind(profile_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
        data: UpdateMember,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(&format!(
            r#"
            UPDATE project_members
            SET role = COALESCE($3, role),
                hours_per_week = COALESCE($4, hours_per_week),
                active = COALESCE($5, active)
            WHERE project_id = $1 AND profile_id = $2
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(project_id)
        .bind(profile_id)
        .bind(data.role.as_deref().map(str::trim))
        .bind(data.hours_per_week)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn remove(pool: &PgPool, project_id: Uuid, profile_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = $1 AND profile_id = $2",
        )
        .bind(project_id)
        .bind(profile_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Members of a project with their profile details, active first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<MemberWithProfile>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithProfile>(
            r#"
            SELECT m.project_id, m.profile_id, m.role, m.hours_per_week, m.active, m.joined_at,
                   p.email, p.first_name, p.last_name, p.preferred_name, p.avatar_url
            FROM project_members m
            JOIN profiles p ON p.id = m.profile_id
            WHERE m.project_id = $1
            ORDER BY m.active DESC, m.joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
