/// Internship applicants
///
/// Applicants are external candidates and are kept apart from employee
/// profiles. Each moves through a small pipeline:
///
/// ```text
/// applied -> in_review -> interview -> accepted
///     \          \            \-----> rejected
///      \          \---------------->  rejected
///       \-- any open stage -------->  withdrawn
/// ```
///
/// `accepted`, `rejected` and `withdrawn` are final. Accepted applicants may
/// be assigned a project and a mentor.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE applicant_status AS ENUM (
///     'applied', 'in_review', 'interview', 'accepted', 'rejected', 'withdrawn'
/// );
///
/// CREATE TABLE applicants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     phone VARCHAR(50),
///     country VARCHAR(100),
///     university VARCHAR(255),
///     degree VARCHAR(255),
///     graduation_year INTEGER,
///     cv_url VARCHAR(1024),
///     status applicant_status NOT NULL DEFAULT 'applied',
///     project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     mentor_id UUID REFERENCES profiles(id) ON DELETE SET NULL,
///     notes TEXT,
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
#[sqlx(type_name = "applicant_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    Applied,
    InReview,
    Interview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantStatus::Applied => "applied",
            ApplicantStatus::InReview => "in_review",
            ApplicantStatus::Interview => "interview",
            ApplicantStatus::Accepted => "accepted",
            ApplicantStatus::Rejected => "rejected",
            ApplicantStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ApplicantStatus::Accepted | ApplicantStatus::Rejected | ApplicantStatus::Withdrawn
        )
    }

    /// Whether the pipeline allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: ApplicantStatus) -> bool {
        use ApplicantStatus::*;

        if self.is_final() || *self == next {
            return false;
        }

        match next {
            Applied => false,
            InReview => *self == Applied,
            Interview => *self == InReview,
            Accepted => *self == Interview,
            Rejected | Withdrawn => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Applicant {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub graduation_year: Option<i32>,
    pub cv_url: Option<String>,
    pub status: ApplicantStatus,
    pub project_id: Option<Uuid>,
    pub mentor_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateApplicant {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub graduation_year: Option<i32>,
    pub cv_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantFilter {
    /// Matches name, email or university
    pub q: Option<String>,
    pub status: Option<ApplicantStatus>,
}

/// Why a status change was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Applicant not found")]
    NotFound,

    #[error("Cannot move applicant from {from} to {to}")]
    NotAllowed { from: &'static str, to: &'static str },
}

const APPLICANT_COLUMNS: &str = "id, email, first_name, last_name, phone, country, university, \
     degree, graduation_year, cv_url, status, project_id, mentor_id, notes, created_at, updated_at";

impl Applicant {
    pub async fn create(pool: &PgPool, data: CreateApplicant) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(&format!(
            r#"
            INSERT INTO applicants (
                email, first_name, last_name, phone, country,
                university, degree, graduation_year, cv_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        ))
        .bind(normalize_email(&data.email))
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(data.phone)
        .bind(data.country)
        .bind(data.university)
        .bind(data.degree)
        .bind(data.graduation_year)
        .bind(data.cv_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {} FROM applicants WHERE id = $1",
            APPLICANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {} FROM applicants WHERE email = $1",
            APPLICANT_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }

    pub async fn search(
        pool: &PgPool,
        filter: &ApplicantFilter,
        page: Pagination,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(&format!(
            r#"
            SELECT {}
            FROM applicants
            WHERE ($1::text IS NULL
                   OR first_name ILIKE $1 OR last_name ILIKE $1
                   OR email ILIKE $1 OR university ILIKE $1)
              AND ($2::applicant_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            APPLICANT_COLUMNS
        ))
        .bind(filter.q.as_deref().filter(|q| !q.trim().is_empty()).map(like_pattern))
        .bind(filter.status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
    }

    /// Moves the applicant along the pipeline
    ///
    /// The update is conditional on the status read, so a concurrent change
    /// makes this call fail instead of skipping a stage.
    pub async fn transition(
        pool: &PgPool,
        id: Uuid,
        next: ApplicantStatus,
        notes: Option<&str>,
    ) -> Result<Result<Self, TransitionError>, sqlx::Error> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(Err(TransitionError::NotFound));
        };

        if !current.status.can_transition_to(next) {
            return Ok(Err(TransitionError::NotAllowed {
                from: current.status.as_str(),
                to: next.as_str(),
            }));
        }

        let updated = sqlx::query_as::<_, Applicant>(&format!(
            r#"
            UPDATE applicants
            SET status = $3,
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        ))
        .bind(id)
        .bind(current.status)
        .bind(next)
        .bind(notes)
        .fetch_optional(pool)
        .await?;

        Ok(updated.ok_or(TransitionError::NotAllowed {
            from: current.status.as_str(),
            to: next.as_str(),
        }))
    }

    /// Assigns a project and/or mentor; None leaves the column unchanged
    pub async fn assign(
        pool: &PgPool,
        id: Uuid,
        project_id: Option<Uuid>,
        mentor_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Applicant>(&format!(
            r#"
            UPDATE applicants
            SET project_id = COALESCE($2, project_id),
                mentor_id = COALESCE($3, mentor_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICANT_COLUMNS
        ))
        .bind(id)
        .bind(project_id)
        .bind(mentor_id)
        .fetch_optional(pool)
        .await
    }
}
