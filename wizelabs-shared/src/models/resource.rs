/// Project resources: links to the tools and infrastructure a project uses
/// (cloud accounts, repositories, design files, documents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub project_id: Uuid,
    /// e.g. "cloud", "repository", "document"
    pub resource_type: String,
    /// e.g. "AWS", "GitHub", "Figma"
    pub provider: String,
    pub name: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResource {
    pub project_id: Uuid,
    pub resource_type: String,
    pub provider: String,
    pub name: String,
    pub url: Option<String>,
}

const RESOURCE_COLUMNS: &str = "id, project_id, resource_type, provider, name, url, created_at";

impl Resource {
    pub async fn create(pool: &PgPool, data: CreateResource) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Resource>(&format!(
            r#"
            INSERT INTO resources (project_id, resource_type, provider, name, url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(data.project_id)
        .bind(data.resource_type.trim())
        .bind(data.provider.trim())
        .bind(data.name.trim())
        .bind(data.url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources WHERE id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Resource>(&format!(
            "SELECT {} FROM resources WHERE project_id = $1 ORDER BY resource_type, name",
            RESOURCE_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
