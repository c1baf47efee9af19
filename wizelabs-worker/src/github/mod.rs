/// GitHub ingestion
///
/// Pulls repository events and releases for every linked repository and
/// stores them keyed by GitHub's id. Rate limits are logged, not budgeted.
///
/// # Example
///
/// ```no_run
/// use wizelabs_worker::github::{GitHubClient, ingest_activity};
/// use wizelabs_worker::config::GitHubConfig;
/// use wizelabs_shared::models::github::GitHubProject;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, config: GitHubConfig) -> anyhow::Result<()> {
/// let client = GitHubClient::new(&config)?;
/// for project in GitHubProject::list_active(&pool).await? {
///     let inserted = ingest_activity(&pool, &client, &project).await?;
///     println!("{}: {} new events", project.repo, inserted);
/// }
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod ingest;

pub use client::{GitHubClient, Page};
pub use ingest::{ingest_activity, ingest_releases};

use chrono::{DateTime, Utc};
use wizelabs_shared::models::github::RepoRef;

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub rate limit exhausted until {reset_at:?}")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not a GitHub repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type GitHubResult<T> = Result<T, GitHubError>;

pub fn parse_repo_url(url: &str) -> GitHubResult<RepoRef> {
    RepoRef::parse(url).ok_or_else(|| GitHubError::InvalidRepoUrl(url.to_string()))
}

/// Extracts the `rel="next"` target from a `Link` header
///
/// `<https://api.github.com/repositories/1/events?page=2>; rel="next", <...>; rel="last"`
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == r#"rel="next""# || p == "rel=next"
        });

        if !is_next {
            return None;
        }

        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
