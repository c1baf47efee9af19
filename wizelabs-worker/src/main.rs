//! # Wizelabs Worker
//!
//! Keeps local data in step with external systems:
//! - GitHub events and releases for every linked repository
//! - Employee profiles from the data warehouse
//!
//! A job whose settings are missing is disabled with a warning.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p wizelabs-worker
//! ```

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizelabs_shared::db::{
    migrations::{get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use wizelabs_worker::{
    config::WorkerConfig,
    consolidation::WarehouseClient,
    github::GitHubClient,
    jobs::{ConsolidationJob, GitHubSyncJob},
    scheduler::SyncScheduler,
};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wizelabs_worker=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Wizelabs Worker v{} starting", env!("CARGO_PKG_VERSION"));

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone())
            .with_max_connections(config.max_connections),
    )
    .await?;
    run_migrations(&pool).await?;

    let schema = get_migration_status(&pool).await?;
    tracing::info!(
        applied = schema.applied_migrations,
        latest_version = ?schema.latest_version,
        "Schema ready"
    );

    let mut scheduler = SyncScheduler::new(config.sync_interval);

    match &config.github {
        Some(github) => {
            let client = GitHubClient::new(github)?;
            scheduler.register(Arc::new(GitHubSyncJob::new(pool.clone(), client)));
        }
        None => tracing::warn!("GITHUB_TOKEN not set; GitHub sync disabled"),
    }

    match config.warehouse.clone() {
        Some(warehouse) => {
            let source = Arc::new(WarehouseClient::new(warehouse)?);
            scheduler.register(Arc::new(ConsolidationJob::new(pool.clone(), source)));
        }
        None => tracing::warn!("WAREHOUSE_URL or WAREHOUSE_TOKEN not set; profile consolidation disabled"),
    }

    if scheduler.job_count() == 0 {
        tracing::warn!("No sync jobs enabled; the worker will idle until stopped");
    }

    let token = scheduler.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutdown signal received");
        token.cancel();
    });

    scheduler.run().await;

    close_pool(pool).await;
    tracing::info!("Worker stopped");

    Ok(())
}
