/// Innovation tiers
///
/// A tier classifies a project's maturity/funding stage and documents what
/// the tier expects (`requisites`), what it aims for (`goals`) and what the
/// team receives (`benefits`). Projects may have no tier yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InnovationTier {
    pub id: Uuid,
    pub name: String,
    pub goals: String,
    pub requisites: String,
    pub benefits: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateInnovationTier {
    pub name: String,
    pub goals: String,
    pub requisites: String,
    pub benefits: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInnovationTier {
    pub name: Option<String>,
    pub goals: Option<String>,
    pub requisites: Option<String>,
    pub benefits: Option<String>,
}

const TIER_COLUMNS: &str = "id, name, goals, requisites, benefits, created_at, updated_at";

impl InnovationTier {
    pub async fn create(pool: &PgPool, data: CreateInnovationTier) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, InnovationTier>(&format!(
            r#"
            INSERT INTO innovation_tiers (name, goals, requisites, benefits)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TIER_COLUMNS
        ))
        .bind(data.name.trim())
        .bind(data.goals)
        .bind(data.requisites)
        .bind(data.benefits)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, InnovationTier>(&format!(
            "SELECT {} FROM innovation_tiers ORDER BY name ASC",
            TIER_COLUMNS
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, InnovationTier>(&format!(
            "SELECT {} FROM innovation_tiers WHERE id = $1",
            TIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateInnovationTier,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, InnovationTier>(&format!(
            r#"
            UPDATE innovation_tiers
            SET name = COALESCE($2, name),
                goals = COALESCE($3, goals),
                requisites = COALESCE($4, requisites),
                benefits = COALESCE($5, benefits),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TIER_COLUMNS
        ))
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.goals)
        .bind(data.requisites)
        .bind(data.benefits)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM innovation_tiers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
