/// Worker configuration
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
/// - `SYNC_INTERVAL_SECS`: seconds between sync rounds (default: 3600)
/// - `GITHUB_TOKEN`: personal access token; GitHub sync is off without it
/// - `GITHUB_API_URL`: API base URL (default: `https://api.github.com`)
/// - `GITHUB_MAX_PAGES`: pages fetched per repository and feed (default: 3)
/// - `WAREHOUSE_URL`, `WAREHOUSE_TOKEN`: statements endpoint and bearer token;
///   consolidation is off unless both are set
/// - `WAREHOUSE_DATABASE`, `WAREHOUSE_SCHEMA`, `WAREHOUSE_NAME`: session context
/// - `WAREHOUSE_PROFILES_QUERY`: statement returning active employees

use std::env;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub const DEFAULT_PROFILES_QUERY: &str = "SELECT email, first_name, last_name, avatar_url, \
     department, job_title, location, business_unit FROM employees WHERE status = 'Active'";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub sync_interval: Duration,
    pub github: Option<GitHubConfig>,
    pub warehouse: Option<WarehouseConfig>,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
    pub max_pages: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub url: String,
    pub token: String,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub warehouse: Option<String>,
    pub profiles_query: String,
    pub timeout: Duration,
}

fn parse_var<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        None => Ok(default),
    }
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let interval_secs: u64 = parse_var(var("SYNC_INTERVAL_SECS"), "SYNC_INTERVAL_SECS", 3600)?;
        if interval_secs == 0 {
            anyhow::bail!("SYNC_INTERVAL_SECS must be greater than zero");
        }

        let github = match var("GITHUB_TOKEN") {
            Some(token) => Some(GitHubConfig {
                token,
                api_url: var("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                max_pages: parse_var::<u32>(var("GITHUB_MAX_PAGES"), "GITHUB_MAX_PAGES", 3)?.max(1),
                timeout: Duration::from_secs(30),
            }),
            None => None,
        };

        let warehouse = match (var("WAREHOUSE_URL"), var("WAREHOUSE_TOKEN")) {
            (Some(url), Some(token)) => Some(WarehouseConfig {
                url: url.trim_end_matches('/').to_string(),
                token,
                database: var("WAREHOUSE_DATABASE"),
                schema: var("WAREHOUSE_SCHEMA"),
                warehouse: var("WAREHOUSE_NAME"),
                profiles_query: var("WAREHOUSE_PROFILES_QUERY")
                    .unwrap_or_else(|| DEFAULT_PROFILES_QUERY.to_string()),
                timeout: Duration::from_secs(120),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections: parse_var(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 5)?,
            sync_interval: Duration::from_secs(interval_secs),
            github,
            warehouse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<WorkerConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_minimal_config_disables_integrations() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/wizelabs")]).unwrap();

        assert_eq!(config.sync_interval, Duration::from_secs(3600));
        assert_eq!(config.max_connections, 5);
        assert!(config.github.is_none());
        assert!(config.warehouse.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_github_settings() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
            ("GITHUB_MAX_PAGES", "0"),
        ])
        .unwrap();

        let github = config.github.unwrap();
        assert_eq!(github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(github.max_pages, 1);
    }

    #[test]
    fn test_github_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("GITHUB_TOKEN", "ghp_test"),
        ])
        .unwrap();

        let github = config.github.unwrap();
        assert_eq!(github.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(github.max_pages, 3);
    }

    #[test]
    fn test_warehouse_needs_url_and_token() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("WAREHOUSE_URL", "https://acct.warehouse.example.com"),
        ])
        .unwrap();
        assert!(config.warehouse.is_none());

        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("WAREHOUSE_URL", "https://acct.warehouse.example.com/"),
            ("WAREHOUSE_TOKEN", "token"),
            ("WAREHOUSE_SCHEMA", "HR"),
        ])
        .unwrap();

        let warehouse = config.warehouse.unwrap();
        assert_eq!(warehouse.url, "https://acct.warehouse.example.com");
        assert_eq!(warehouse.schema.as_deref(), Some("HR"));
        assert_eq!(warehouse.profiles_query, DEFAULT_PROFILES_QUERY);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("SYNC_INTERVAL_SECS", "soon"),
        ])
        .is_err());

        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("SYNC_INTERVAL_SECS", "0"),
        ])
        .is_err());
    }
}
