/// Sync jobs registered with the scheduler

use crate::consolidation::{consolidate, ProfileSource};
use crate::github::{ingest_activity, ingest_releases, GitHubClient, GitHubError};
use crate::scheduler::{SyncError, SyncJob};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use wizelabs_shared::models::github::GitHubProject;

/// Ingests events and releases for every repository linked to a live project
pub struct GitHubSyncJob {
    pool: PgPool,
    client: GitHubClient,
}

impl GitHubSyncJob {
    pub fn new(pool: PgPool, client: GitHubClient) -> Self {
        Self { pool, client }
    }
}

#[async_trait]
impl SyncJob for GitHubSyncJob {
    fn name(&self) -> &str {
        "github"
    }

    async fn run(&self) -> Result<String, SyncError> {
        let repos = GitHubProject::list_active(&self.pool).await?;

        let mut events = 0;
        let mut releases = 0;
        let mut failed = 0;

        for repo in &repos {
            let result = async {
                let e = ingest_activity(&self.pool, &self.client, repo).await?;
                let r = ingest_releases(&self.pool, &self.client, repo).await?;
                Ok::<_, GitHubError>((e, r))
            }
            .await;

            match result {
                Ok((e, r)) => {
                    events += e;
                    releases += r;
                }
                Err(e) => {
                    tracing::error!(
                        owner = %repo.owner,
                        repo = %repo.repo,
                        github_project_id = %repo.id,
                        error = %e,
                        "Failed to ingest repository"
                    );
                    failed += 1;
                }
            }
        }

        Ok(format!(
            "GitHub sync: {} repositories, {} new events, {} new releases, {} failed",
            repos.len(),
            events,
            releases,
            failed
        ))
    }
}

/// Refreshes profiles from the warehouse
pub struct ConsolidationJob {
    pool: PgPool,
    source: Arc<dyn ProfileSource>,
}

impl ConsolidationJob {
    pub fn new(pool: PgPool, source: Arc<dyn ProfileSource>) -> Self {
        Self { pool, source }
    }
}

#[async_trait]
impl SyncJob for ConsolidationJob {
    fn name(&self) -> &str {
        "consolidation"
    }

    async fn run(&self) -> Result<String, SyncError> {
        let report = consolidate(&self.pool, self.source.as_ref()).await?;

        Ok(format!(
            "Consolidation: {} fetched, {} upserted, {} failed, {} terminated",
            report.fetched, report.upserted, report.failed, report.terminated
        ))
    }
}
