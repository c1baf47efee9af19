/// Project votes
///
/// A profile can vote for a project at most once; the composite primary key
/// enforces it. Voting is a toggle: a second vote removes the first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE votes (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     profile_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, profile_id)
/// );
/// ```
///
/// # Concurrency
///
/// The toggle deletes first and only inserts when nothing was deleted, inside
/// one transaction, with `ON CONFLICT DO NOTHING` on the insert. Two
/// concurrent toggles from the same profile can no longer both insert or
/// fail on the primary key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub project_id: Uuid,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a toggle as seen by the voter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteState {
    /// Whether the profile now has a vote on the project
    pub voted: bool,

    /// Total votes on the project after the toggle
    pub count: i64,
}

impl Vote {
    /// Adds the vote if absent, removes it if present
    pub async fn toggle(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
    ) -> Result<VoteState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM votes WHERE project_id = $1 AND profile_id = $2",
        )
        .bind(project_id)
        .bind(profile_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !removed {
            sqlx::query(
                r#"
                INSERT INTO votes (project_id, profile_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(project_id)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(%project_id, %profile_id, voted = !removed, count, "Vote toggled");
        Ok(VoteState {
            voted: !removed,
            count,
        })
    }

    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    pub async fn has_voted(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM votes WHERE project_id = $1 AND profile_id = $2)",
        )
        .bind(project_id)
        .bind(profile_id)
        .fetch_one(pool)
        .await
    }

    /// Current state for one voter without changing anything
    pub async fn state(
        pool: &PgPool,
        project_id: Uuid,
        profile_id: Uuid,
    ) -> Result<VoteState, sqlx::Error> {
        Ok(VoteState {
            voted: Self::has_voted(pool, project_id, profile_id).await?,
            count: Self::count_by_project(pool, project_id).await?,
        })
    }

    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vote>(
            r#"
            SELECT project_id, profile_id, created_at
            FROM votes
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
