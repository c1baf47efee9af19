/// Project comments
///
/// Comments are threaded through `parent_id`; deleting a comment deletes
/// its replies. A reply must belong to the same project as
/// its parent, which `create` checks inside the insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its author's display fields
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_preferred_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
}

const COMMENT_COLUMNS: &str = "id, project_id, author_id, parent_id, body, created_at, updated_at";

impl Comment {
    /// Inserts a comment
    ///
    /// Returns `RowNotFound` when `parent_id` does not name a comment on the
    /// same project.
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (project_id, author_id, parent_id, body)
            SELECT $1, $2, $3, $4
            WHERE $3::uuid IS NULL
               OR EXISTS (SELECT 1 FROM comments WHERE id = $3 AND project_id = $1)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(data.project_id)
        .bind(data.author_id)
        .bind(data.parent_id)
        .bind(data.body.trim())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_body(pool: &PgPool, id: Uuid, body: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET body = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(body.trim())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All comments on a project in posting order; clients build the tree
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.project_id, c.author_id, c.parent_id, c.body,
                   c.created_at, c.updated_at,
                   p.first_name AS author_first_name,
                   p.last_name AS author_last_name,
                   p.preferred_name AS author_preferred_name,
                   p.avatar_url AS author_avatar_url
            FROM comments c
            JOIN profiles p ON p.id = c.author_id
            WHERE c.project_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
