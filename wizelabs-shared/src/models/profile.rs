/// Employee profile model
///
/// Profiles form the people directory. Most columns are owned by the data
/// warehouse and overwritten on every consolidation run; `preferred_name`
/// and `bio` are edited by the employee and never touched by the sync.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE employee_status AS ENUM ('active', 'terminated');
///
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     first_name VARCHAR(255) NOT NULL DEFAULT '',
///     last_name VARCHAR(255) NOT NULL DEFAULT '',
///     preferred_name VARCHAR(255),
///     avatar_url VARCHAR(1024),
///     department VARCHAR(255),
///     job_title VARCHAR(255),
///     location VARCHAR(255),
///     business_unit VARCHAR(255),
///     employee_status employee_status NOT NULL DEFAULT 'active',
///     bio TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{like_pattern, normalize_email, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employee_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub avatar_url: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub business_unit: Option<String>,
    pub employee_status: EmployeeStatus,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Preferred name when set, otherwise "first last"
    pub fn display_name(&self) -> String {
        match self.preferred_name.as_deref().map(str::trim) {
            Some(preferred) if !preferred.is_empty() => preferred.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string(),
        }
    }
}

/// Warehouse-owned attributes written by consolidation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub business_unit: Option<String>,
}

/// Self-service fields; None leaves the column unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub preferred_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Directory filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFilter {
    /// Matches name, preferred name, email or job title
    pub q: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
}

const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, preferred_name, avatar_url, \
     department, job_title, location, business_unit, employee_status, bio, created_at, updated_at";

impl Profile {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE email = $1",
            PROFILE_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }

    /// Returns the profile for `email`, creating a minimal one if missing
    ///
    /// Used at login for employees who signed in before the warehouse sync
    /// picked them up. Existing rows are returned untouched.
    pub async fn ensure_exists(
        pool: &PgPool,
        email: &str,
        first_name: &str,
        last_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let email = normalize_email(email);

        let inserted = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (email, first_name, last_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&email)
        .bind(first_name)
        .bind(last_name)
        .bind(avatar_url)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(profile) => {
                tracing::info!(profile_id = %profile.id, "Created profile at login");
                Ok(profile)
            }
            None => Self::find_by_email(pool, &email)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Inserts or overwrites the warehouse-owned columns for one employee
    ///
    /// The profile is (re)activated. Last write wins.
    pub async fn upsert_from_warehouse(
        pool: &PgPool,
        data: &UpsertProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (
                email, first_name, last_name, avatar_url, department,
                job_title, location, business_unit, employee_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
            ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                avatar_url = COALESCE(EXCLUDED.avatar_url, profiles.avatar_url),
                department = EXCLUDED.department,
                job_title = EXCLUDED.job_title,
                location = EXCLUDED.location,
                business_unit = EXCLUDED.business_unit,
                employee_status = 'active',
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(normalize_email(&data.email))
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.avatar_url)
        .bind(&data.department)
        .bind(&data.job_title)
        .bind(&data.location)
        .bind(&data.business_unit)
        .fetch_one(pool)
        .await
    }

    /// Marks every active profile whose email is not in `keep` as terminated
    ///
    /// Returns the number of profiles that changed status.
    pub async fn terminate_missing(pool: &PgPool, keep: &[String]) -> Result<u64, sqlx::Error> {
        let keep: Vec<String> = keep.iter().map(|e| normalize_email(e)).collect();

        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET employee_status = 'terminated', updated_at = NOW()
            WHERE employee_status = 'active'
              AND NOT (email = ANY($1))
            "#,
        )
        .bind(&keep)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET preferred_name = COALESCE($2, preferred_name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(data.preferred_name)
        .bind(data.bio)
        .bind(data.avatar_url)
        .fetch_optional(pool)
        .await
    }

    /// Directory search, ordered by last then first name
    pub async fn search(
        pool: &PgPool,
        filter: &ProfileFilter,
        page: Pagination,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {}
            FROM profiles
            WHERE ($1::text IS NULL
                   OR first_name ILIKE $1 OR last_name ILIKE $1
                   OR preferred_name ILIKE $1 OR email ILIKE $1 OR job_title ILIKE $1)
              AND ($2::text IS NULL OR department = $2)
              AND ($3::employee_status IS NULL OR employee_status = $3)
            ORDER BY last_name ASC, first_name ASC
            LIMIT $4 OFFSET $5
            "#,
            PROFILE_COLUMNS
        ))
        .bind(filter.q.as_deref().filter(|q| !q.trim().is_empty()).map(like_pattern))
        .bind(filter.department.as_deref())
        .bind(filter.status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_status(pool: &PgPool, status: EmployeeStatus) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE employee_status = $1")
            .bind(status)
            .fetch_one(pool)
            .await
    }
}
