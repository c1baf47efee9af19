/// Project statuses (admin taxonomy)
///
/// Statuses are ordered by `position` so the UI can show them as a pipeline
/// ("Idea", "In progress", "Launched", ...). Every project references one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectStatus {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectStatus {
    pub name: Option<String>,
    pub position: Option<i32>,
}

impl ProjectStatus {
    pub async fn create(pool: &PgPool, name: &str, position: i32) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            r#"
            INSERT INTO project_statuses (name, position)
            VALUES ($1, $2)
            RETURNING id, name, position, created_at
            "#,
        )
        .bind(name.trim())
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            "SELECT id, name, position, created_at FROM project_statuses ORDER BY position, name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            "SELECT id, name, position, created_at FROM project_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// First status in pipeline order; new proposals start here
    pub async fn first(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            r#"
            SELECT id, name, position, created_at
            FROM project_statuses
            ORDER BY position ASC, name ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProjectStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectStatus>(
            r#"
            UPDATE project_statuses
            SET name = COALESCE($2, name),
                position = COALESCE($3, position)
            WHERE id = $1
            RETURNING id, name, position, created_at
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.position)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
