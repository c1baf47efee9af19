/// Project labels (admin taxonomy)
///
/// A label in use by any project cannot be deleted; the foreign key from
/// `project_labels` is `ON DELETE RESTRICT` and the violation surfaces as a
/// conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            "INSERT INTO labels (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name.trim())
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels ORDER BY name ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name.trim())
        .fetch_optional(pool)
        .await
    }

    /// Returns false when no label had that id
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Labels attached to a project
    pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            SELECT l.id, l.name, l.created_at
            FROM labels l
            JOIN project_labels pl ON pl.label_id = l.id
            WHERE pl.project_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
