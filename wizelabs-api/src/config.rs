/// Configuration management for the API server
///
/// Loaded from environment variables (and a `.env` file in development).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST` / `API_PORT`: bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: comma-separated origins, `*` for any (default: `*`)
/// - `PRODUCTION`: enables HSTS and secure cookies (default: false)
/// - `JWT_SECRET`: session signing key, at least 32 characters (required)
/// - `OAUTH_ISSUER`, `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`,
///   `OAUTH_REDIRECT_URL`: identity provider (required)
/// - `ORG_EMAIL_DOMAIN`: employee email domain (required)
/// - `INTERN_EMAIL_DOMAINS`: comma-separated intern domains (default: none)
///
/// # Example
///
/// ```no_run
/// use wizelabs_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use wizelabs_shared::auth::roles::RolePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub oauth: OAuthConfig,
    pub roles: RoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode: HSTS header and `Secure` cookies
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Identity provider settings for the authorization-code flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Base URL; `/authorize`, `/oauth/token` and `/userinfo` hang off it
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub org_email_domain: String,
    pub intern_email_domains: Vec<String>,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable lookup
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let port = var("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let production = var("PRODUCTION")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins = split_list(&var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            oauth: OAuthConfig {
                issuer: required("OAUTH_ISSUER")?.trim_end_matches('/').to_string(),
                client_id: required("OAUTH_CLIENT_ID")?,
                client_secret: required("OAUTH_CLIENT_SECRET")?,
                redirect_url: required("OAUTH_REDIRECT_URL")?,
            },
            roles: RoleConfig {
                org_email_domain: required("ORG_EMAIL_DOMAIN")?,
                intern_email_domains: split_list(&var("INTERN_EMAIL_DOMAINS").unwrap_or_default()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn role_policy(&self) -> RolePolicy {
        RolePolicy::new(&self.roles.org_email_domain, &self.roles.intern_email_domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("DATABASE_URL", "postgresql://localhost/wizelabs"),
            ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
            ("OAUTH_ISSUER", "https://login.example.com/"),
            ("OAUTH_CLIENT_ID", "client"),
            ("OAUTH_CLIENT_SECRET", "secret"),
            ("OAUTH_REDIRECT_URL", "http://localhost:8080/auth/callback"),
            ("ORG_EMAIL_DOMAIN", "wizeline.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (k, v) in extra {
            map.insert(k.to_string(), v.to_string());
        }
        map
    }

    fn load(map: &HashMap<String, String>) -> anyhow::Result<Config> {
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&vars(&[])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(!config.api.production);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.oauth.issuer, "https://login.example.com");
        assert!(config.roles.intern_email_domains.is_empty());
    }

    #[test]
    fn test_lists_and_flags() {
        let config = load(&vars(&[
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
            ("INTERN_EMAIL_DOMAINS", "interns.wizeline.com,,academy.org"),
            ("PRODUCTION", "true"),
            ("API_PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.api.cors_origins.len(), 2);
        assert_eq!(config.roles.intern_email_domains, vec!["interns.wizeline.com", "academy.org"]);
        assert!(config.api.production);
        assert_eq!(config.api.port, 9000);
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = load(&vars(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_missing_required_variable() {
        let mut map = vars(&[]);
        map.remove("OAUTH_CLIENT_ID");

        let err = load(&map).unwrap_err();
        assert!(err.to_string().contains("OAUTH_CLIENT_ID"));
    }

    #[test]
    fn test_role_policy_from_config() {
        let config = load(&vars(&[("INTERN_EMAIL_DOMAINS", "interns.wizeline.com")])).unwrap();
        let policy = config.role_policy();

        assert_eq!(
            policy.role_for_email("x@interns.wizeline.com"),
            wizelabs_shared::models::user::UserRole::Intern
        );
    }
}
