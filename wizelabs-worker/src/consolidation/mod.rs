/// Profile consolidation
///
/// The data warehouse is the source of truth for employee records. Each run
/// upserts every active employee into `profiles` and marks local profiles
/// that no longer appear as terminated.
///
/// ```text
/// ProfileSource::fetch_active_profiles()
///   ├─> Profile::upsert_from_warehouse()   (per row, failures counted)
///   └─> Profile::terminate_missing()       (skipped on an empty result)
/// ```

pub mod warehouse;

pub use warehouse::WarehouseClient;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use wizelabs_shared::models::profile::{Profile, UpsertProfile};

#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Warehouse returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected warehouse response: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Where active employee records come from
#[async_trait]
pub trait ProfileSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_active_profiles(&self) -> Result<Vec<UpsertProfile>, WarehouseError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    pub fetched: usize,
    pub upserted: usize,
    pub failed: usize,
    pub terminated: u64,
}

pub async fn consolidate(
    pool: &PgPool,
    source: &dyn ProfileSource,
) -> Result<ConsolidationReport, WarehouseError> {
    let profiles = source.fetch_active_profiles().await?;

    let mut report = ConsolidationReport {
        fetched: profiles.len(),
        ..Default::default()
    };

    let mut seen = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        if profile.email.trim().is_empty() {
            tracing::warn!(source = source.name(), "Skipping warehouse row without email");
            report.failed += 1;
            continue;
        }

        match Profile::upsert_from_warehouse(pool, profile).await {
            Ok(_) => report.upserted += 1,
            Err(e) => {
                tracing::error!(email = %profile.email, error = %e, "Failed to upsert profile");
                report.failed += 1;
            }
        }

        // Still active upstream even if the local write failed
        seen.push(profile.email.clone());
    }

    if seen.is_empty() {
        tracing::warn!(
            source = source.name(),
            "Warehouse returned no active employees; skipping termination"
        );
    } else {
        report.terminated = Profile::terminate_missing(pool, &seen).await?;
    }

    tracing::info!(
        source = source.name(),
        fetched = report.fetched,
        upserted = report.upserted,
        failed = report.failed,
        terminated = report.terminated,
        "Profile consolidation finished"
    );

    Ok(report)
}
