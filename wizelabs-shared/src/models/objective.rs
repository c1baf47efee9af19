use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A measurable goal a project commits to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Objective {
    pub id: Uuid,
    pub project_id: Uuid,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateObjective {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

const OBJECTIVE_COLUMNS: &str = "id, project_id, description, completed, created_at, updated_at";

impl Objective {
    pub async fn create(pool: &PgPool, project_id: Uuid, description: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Objective>(&format!(
            "INSERT INTO objectives (project_id, description) VALUES ($1, $2) RETURNING {}",
            OBJECTIVE_COLUMNS
        ))
        .bind(project_id)
        .bind(description.trim())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Objective>(&format!(
            "SELECT {} FROM objectives WHERE id = $1",
            OBJECTIVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Objective>(&format!(
            "SELECT {} FROM objectives WHERE project_id = $1 ORDER BY created_at ASC",
            OBJECTIVE_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateObjective,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Objective>(&format!(
            r#"
            UPDATE objectives
            SET description = COALESCE($2, description),
                completed = COALESCE($3, completed),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            OBJECTIVE_COLUMNS
        ))
        .bind(id)
        .bind(data.description.as_deref().map(str::trim))
        .bind(data.completed)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM objectives WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
