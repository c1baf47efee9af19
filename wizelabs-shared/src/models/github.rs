/// GitHub links and ingested activity
///
/// Profiles link a GitHub username, projects link one or more repositories.
/// The worker pulls events and releases for every linked repository and
/// stores them keyed by GitHub's own id, so re-ingesting a page is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GitHubProfile {
    pub profile_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GitHubProject {
    pub id: Uuid,
    pub project_id: Uuid,
    pub repo_url: String,
    pub owner: String,
    pub repo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GitHubActivity {
    pub id: Uuid,
    pub github_project_id: Uuid,
    pub external_id: String,
    pub event_type: String,
    pub actor_login: String,
    pub actor_avatar_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An event as read from the GitHub API, before it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewGitHubActivity {
    pub external_id: String,
    pub event_type: String,
    pub actor_login: String,
    pub actor_avatar_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GitHubRelease {
    pub id: Uuid,
    pub github_project_id: Uuid,
    pub external_id: String,
    pub tag_name: String,
    pub name: Option<String>,
    pub author_login: Option<String>,
    pub html_url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGitHubRelease {
    pub external_id: String,
    pub tag_name: String,
    pub name: Option<String>,
    pub author_login: Option<String>,
    pub html_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

const PROJECT_COLUMNS: &str = "id, project_id, repo_url, owner, repo, created_at";

const ACTIVITY_COLUMNS: &str = "id, github_project_id, external_id, event_type, actor_login, \
     actor_avatar_url, occurred_at, payload, created_at";

const RELEASE_COLUMNS: &str = "id, github_project_id, external_id, tag_name, name, author_login, \
     html_url, published_at, created_at";

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Accepts the usual ways people paste a repository address:
    /// `https://github.com/o/r`, `github.com/o/r`, `git@github.com:o/r.git`,
    /// with or without a trailing slash, extra path (`/tree/main`), query
    /// string or fragment.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        let rest = rest.strip_prefix("www.").unwrap_or(rest);

        let path = rest
            .strip_prefix("git@github.com:")
            .or_else(|| rest.strip_prefix("github.com/"))
            .or_else(|| rest.strip_prefix("github.com:"))?;
        let path = match path.find(['?', '#']) {
            Some(end) => &path[..end],
            None => path,
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if repo.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl GitHubProfile {
    /// Links (or re-links) a profile to a GitHub username
    pub async fn link(pool: &PgPool, profile_id: Uuid, username: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GitHubProfile>(
            r#"
            INSERT INTO github_profiles (profile_id, username)
            VALUES ($1, $2)
            ON CONFLICT (profile_id) DO UPDATE SET username = EXCLUDED.username
            RETURNING profile_id, username, created_at
            "#,
        )
        .bind(profile_id)
        .bind(username.trim())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_profile(
        pool: &PgPool,
        profile_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubProfile>(
            "SELECT profile_id, username, created_at FROM github_profiles WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn unlink(pool: &PgPool, profile_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM github_profiles WHERE profile_id = $1")
            .bind(profile_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl GitHubProject {
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        repo_url: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GitHubProject>(&format!(
            r#"
            INSERT INTO github_projects (project_id, repo_url, owner, repo)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(project_id)
        .bind(repo_url.trim())
        .bind(owner)
        .bind(repo)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubProject>(&format!(
            "SELECT {} FROM github_projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubProject>(&format!(
            "SELECT {} FROM github_projects WHERE project_id = $1 ORDER BY created_at ASC",
            PROJECT_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Every linked repository of a non-archived project
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubProject>(
            r#"
            SELECT g.id, g.project_id, g.repo_url, g.owner, g.repo, g.created_at
            FROM github_projects g
            JOIN projects p ON p.id = g.project_id
            WHERE p.is_archived = FALSE
            ORDER BY g.created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM github_projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl GitHubActivity {
    /// Stores an event unless this link already holds one with the same GitHub id
    ///
    /// Returns true when a row was inserted.
    pub async fn insert_if_absent(
        pool: &PgPool,
        github_project_id: Uuid,
        event: &NewGitHubActivity,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO github_activity (
                github_project_id, external_id, event_type, actor_login,
                actor_avatar_url, occurred_at, payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (github_project_id, external_id) DO NOTHING
            "#,
        )
        .bind(github_project_id)
        .bind(&event.external_id)
        .bind(&event.event_type)
        .bind(&event.actor_login)
        .bind(&event.actor_avatar_url)
        .bind(event.occurred_at)
        .bind(&event.payload)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Latest activity across all repositories linked to a project
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubActivity>(
            r#"
            SELECT a.id, a.github_project_id, a.external_id, a.event_type, a.actor_login,
                   a.actor_avatar_url, a.occurred_at, a.payload, a.created_at
            FROM github_activity a
            JOIN github_projects g ON g.id = a.github_project_id
            WHERE g.project_id = $1
            ORDER BY a.occurred_at DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Latest activity by a GitHub user, case-insensitive on the login
    pub async fn list_by_actor(
        pool: &PgPool,
        login: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubActivity>(&format!(
            r#"
            SELECT {}
            FROM github_activity
            WHERE LOWER(actor_login) = LOWER($1)
            ORDER BY occurred_at DESC
            LIMIT $2
            "#,
            ACTIVITY_COLUMNS
        ))
        .bind(login)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

impl GitHubRelease {
    pub async fn insert_if_absent(
        pool: &PgPool,
        github_project_id: Uuid,
        release: &NewGitHubRelease,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO github_releases (
                github_project_id, external_id, tag_name, name,
                author_login, html_url, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (github_project_id, external_id) DO NOTHING
            "#,
        )
        .bind(github_project_id)
        .bind(&release.external_id)
        .bind(&release.tag_name)
        .bind(&release.name)
        .bind(&release.author_login)
        .bind(&release.html_url)
        .bind(release.published_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GitHubRelease>(&format!(
            r#"
            SELECT {}
            FROM github_releases
            WHERE github_project_id IN (SELECT id FROM github_projects WHERE project_id = $1)
            ORDER BY published_at DESC NULLS LAST
            LIMIT $2
            "#,
            RELEASE_COLUMNS
        ))
        .bind(project_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
