/// Project model and database operations
///
/// A project is an innovation proposal owned by a profile. It always has a
/// status, optionally an innovation tier, and any number of labels. The owner
/// is recorded as the first project member when the proposal is created.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     value_statement TEXT,
///     target TEXT,
///     owner_id UUID NOT NULL REFERENCES profiles(id) ON DELETE RESTRICT,
///     status_id UUID NOT NULL REFERENCES project_statuses(id) ON DELETE RESTRICT,
///     tier_id UUID REFERENCES innovation_tiers(id) ON DELETE RESTRICT,
///     slack_channel VARCHAR(255),
///     is_archived BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_labels (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     label_id UUID NOT NULL REFERENCES labels(id) ON DELETE RESTRICT,
///     PRIMARY KEY (project_id, label_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use wizelabs_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid, status_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Smart Parking".to_string(),
///     description: "Find a free spot before you arrive".to_string(),
///     owner_id,
///     status_id,
///     ..Default::default()
/// }).await?;
///
/// let can_edit = Project::is_editor(&pool, project.id, owner_id).await?;
/// assert!(can_edit);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{like_pattern, Pagination};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,

    /// Why the organization should care
    pub value_statement: Option<String>,

    /// Intended audience or customer
    pub target: Option<String>,

    pub owner_id: Uuid,
    pub status_id: Uuid,
    pub tier_id: Option<Uuid>,
    pub slack_channel: Option<String>,

    /// Archived projects are hidden from the default listing
    pub is_archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: the project plus engagement counters
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub vote_count: i64,
    pub member_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub value_statement: Option<String>,
    pub target: Option<String>,
    pub owner_id: Uuid,
    pub status_id: Uuid,
    pub tier_id: Option<Uuid>,
    pub slack_channel: Option<String>,
    pub label_ids: Vec<Uuid>,
}

/// Partial update; `label_ids` replaces the whole label set when present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub value_statement: Option<String>,
    pub target: Option<String>,
    pub status_id: Option<Uuid>,

    /// New tier (use Some(None) to clear)
    pub tier_id: Option<Option<Uuid>>,

    pub slack_channel: Option<String>,
    pub label_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFilter {
    /// Matches name or description
    pub q: Option<String>,
    pub status_id: Option<Uuid>,
    pub tier_id: Option<Uuid>,
    pub label_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub include_archived: bool,
}

const PROJECT_COLUMNS: &str = "id, name, description, value_statement, target, owner_id, \
     status_id, tier_id, slack_channel, is_archived, created_at, updated_at";

impl Project {
    /// Creates a proposal, attaches its labels and enrolls the owner
    ///
    /// Runs in a single transaction.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (
                name, description, value_statement, target,
                owner_id, status_id, tier_id, slack_channel
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.value_statement)
        .bind(&data.target)
        .bind(data.owner_id)
        .bind(data.status_id)
        .bind(data.tier_id)
        .bind(&data.slack_channel)
        .fetch_one(&mut *tx)
        .await?;

        replace_labels(&mut tx, project.id, &data.label_ids).await?;

        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, profile_id, role)
            VALUES ($1, $2, 'Owner')
            "#,
        )
        .bind(project.id)
        .bind(project.owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(project_id = %project.id, owner_id = %project.owner_id, "Project created");
        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                value_statement = COALESCE($4, value_statement),
                target = COALESCE($5, target),
                status_id = COALESCE($6, status_id),
                tier_id = CASE WHEN $9 THEN $7 ELSE tier_id END,
                slack_channel = COALESCE($8, slack_channel),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.description)
        .bind(data.value_statement)
        .bind(data.target)
        .bind(data.status_id)
        .bind(data.tier_id.flatten())
        .bind(data.slack_channel)
        .bind(data.tier_id.is_some())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(project) = project else {
            return Ok(None);
        };

        if let Some(label_ids) = data.label_ids {
            sqlx::query("DELETE FROM project_labels WHERE project_id = $1")
                .bind(project.id)
                .execute(&mut *tx)
                .await?;
            replace_labels(&mut tx, project.id, &label_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Hides a project from the default listing; returns false if not found
    pub async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET is_archived = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(archived)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Permanently removes a project and everything that cascades from it
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Filtered listing, most voted first
    pub async fn search(
        pool: &PgPool,
        filter: &ProjectFilter,
        page: Pagination,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT p.id, p.name, p.description, p.value_statement, p.target, p.owner_id,
                   p.status_id, p.tier_id, p.slack_channel, p.is_archived,
                   p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM votes v WHERE v.project_id = p.id) AS vote_count,
                   (SELECT COUNT(*) FROM project_members m
                     WHERE m.project_id = p.id AND m.active) AS member_count
            FROM projects p
            WHERE ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
              AND ($2::uuid IS NULL OR p.status_id = $2)
              AND ($3::uuid IS NULL OR p.tier_id = $3)
              AND ($4::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM project_labels pl
                    WHERE pl.project_id = p.id AND pl.label_id = $4))
              AND ($5::uuid IS NULL OR p.owner_id = $5)
              AND ($6 OR NOT p.is_archived)
            ORDER BY vote_count DESC, p.created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(filter.q.as_deref().filter(|q| !q.trim().is_empty()).map(like_pattern))
        .bind(filter.status_id)
        .bind(filter.tier_id)
        .bind(filter.label_id)
        .bind(filter.owner_id)
        .bind(filter.include_archived)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await
    }

    /// True when the profile owns the project or is an active member of it
    pub async fn is_editor(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects WHERE id = $1 AND owner_id = $2
                UNION ALL
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND profile_id = $2 AND active
            )
            "#,
        )
        .bind(project_id)
        .bind(profile_id)
        .fetch_one(pool)
        .await
    }

    /// Projects the profile owns or actively works on
    pub async fn list_for_profile(pool: &PgPool, profile_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.value_statement, p.target,
                   p.owner_id, p.status_id, p.tier_id, p.slack_channel, p.is_archived,
                   p.created_at, p.updated_at
            FROM projects p
            LEFT JOIN project_members m ON m.project_id = p.id
            WHERE p.owner_id = $1 OR (m.profile_id = $1 AND m.active)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }
}

async fn replace_labels(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    label_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if label_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO project_labels (project_id, label_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(label_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
