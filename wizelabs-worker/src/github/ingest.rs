/// Storing GitHub feeds
///
/// Each item is inserted keyed by its GitHub id and skipped when already
/// present, so overlapping pages across runs are harmless.

use super::{GitHubClient, GitHubResult};
use sqlx::PgPool;
use wizelabs_shared::models::github::{GitHubActivity, GitHubProject, GitHubRelease, RepoRef};

fn repo_of(project: &GitHubProject) -> RepoRef {
    RepoRef {
        owner: project.owner.clone(),
        repo: project.repo.clone(),
    }
}

/// Fetches up to `max_pages` of repository events; returns the new row count
pub async fn ingest_activity(
    pool: &PgPool,
    client: &GitHubClient,
    project: &GitHubProject,
) -> GitHubResult<u64> {
    let repo = repo_of(project);
    let mut inserted = 0;

    for page in 1..=client.max_pages() {
        let batch = client.list_events(&repo, page).await?;

        for event in &batch.items {
            if GitHubActivity::insert_if_absent(pool, project.id, event).await? {
                inserted += 1;
            }
        }

        if !batch.has_next {
            break;
        }
    }

    tracing::debug!(repo = %repo, inserted, "Ingested activity");
    Ok(inserted)
}

/// Fetches up to `max_pages` of releases; returns the new row count
pub async fn ingest_releases(
    pool: &PgPool,
    client: &GitHubClient,
    project: &GitHubProject,
) -> GitHubResult<u64> {
    let repo = repo_of(project);
    let mut inserted = 0;

    for page in 1..=client.max_pages() {
        let batch = client.list_releases(&repo, page).await?;

        for release in &batch.items {
            if GitHubRelease::insert_if_absent(pool, project.id, release).await? {
                inserted += 1;
            }
        }

        if !batch.has_next {
            break;
        }
    }

    tracing::debug!(repo = %repo, inserted, "Ingested releases");
    Ok(inserted)
}
