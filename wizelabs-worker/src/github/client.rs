/// GitHub REST client
///
/// Authenticated with a personal access token. Every response's rate-limit
/// headers are logged; an exhausted quota comes back as
/// [`GitHubError::RateLimited`].

use super::{next_link, GitHubError, GitHubResult};
use crate::config::GitHubConfig;
use chrono::{DateTime, Utc};
use reqwest::{header, StatusCode};
use serde::Deserialize;
use wizelabs_shared::models::github::{NewGitHubActivity, NewGitHubRelease, RepoRef};

const PER_PAGE: u32 = 100;

/// One page of results and whether GitHub advertised another
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
struct EventActor {
    login: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: Option<String>,
    actor: EventActor,
    created_at: DateTime<Utc>,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ReleaseAuthor {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    id: u64,
    tag_name: String,
    name: Option<String>,
    author: Option<ReleaseAuthor>,
    html_url: String,
    published_at: Option<DateTime<Utc>>,
}

impl From<RawEvent> for NewGitHubActivity {
    fn from(raw: RawEvent) -> Self {
        NewGitHubActivity {
            external_id: raw.id,
            event_type: raw.event_type.unwrap_or_else(|| "UnknownEvent".to_string()),
            actor_login: raw.actor.login,
            actor_avatar_url: raw.actor.avatar_url,
            occurred_at: raw.created_at,
            payload: raw.payload,
        }
    }
}

impl From<RawRelease> for NewGitHubRelease {
    fn from(raw: RawRelease) -> Self {
        NewGitHubRelease {
            external_id: raw.id.to_string(),
            tag_name: raw.tag_name,
            name: raw.name.filter(|n| !n.trim().is_empty()),
            author_login: raw.author.map(|a| a.login),
            html_url: raw.html_url,
            published_at: raw.published_at,
        }
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    max_pages: u32,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> GitHubResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GitHubError::Api {
                status: 0,
                message: "GITHUB_TOKEN contains invalid header characters".to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(concat!("wizelabs-worker/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            max_pages: config.max_pages,
        })
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// `GET /repos/{owner}/{repo}/events`
    pub async fn list_events(&self, repo: &RepoRef, page: u32) -> GitHubResult<Page<NewGitHubActivity>> {
        let page = self.get_page::<RawEvent>(repo, "events", page).await?;
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            has_next: page.has_next,
        })
    }

    /// `GET /repos/{owner}/{repo}/releases`
    pub async fn list_releases(&self, repo: &RepoRef, page: u32) -> GitHubResult<Page<NewGitHubRelease>> {
        let page = self.get_page::<RawRelease>(repo, "releases", page).await?;
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            has_next: page.has_next,
        })
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        repo: &RepoRef,
        feed: &str,
        page: u32,
    ) -> GitHubResult<Page<T>> {
        let url = format!(
            "{}/repos/{}/{}/{}?per_page={}&page={}",
            self.api_url, repo.owner, repo.repo, feed, PER_PAGE, page
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        let remaining = header_str(&headers, "x-ratelimit-remaining");
        let reset_at = reset_time(&headers);
        tracing::debug!(
            repo = %repo,
            feed,
            page,
            status = status.as_u16(),
            ratelimit_remaining = remaining.unwrap_or("?"),
            ratelimit_reset = ?reset_at,
            "GitHub request"
        );

        if !status.is_success() {
            if is_rate_limited(status, remaining) {
                tracing::warn!(repo = %repo, reset_at = ?reset_at, "GitHub rate limit exhausted");
                return Err(GitHubError::RateLimited { reset_at });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        let has_next = header_str(&headers, header::LINK.as_str())
            .and_then(next_link)
            .is_some();
        let items = response.json::<Vec<T>>().await?;

        Ok(Page { items, has_next })
    }
}

fn header_str<'a>(headers: &'a header::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reset_time(headers: &header::HeaderMap) -> Option<DateTime<Utc>> {
    header_str(headers, "x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// 429 always; 403 only when the quota header says zero
fn is_rate_limited(status: StatusCode, remaining: Option<&str>) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && remaining.map(str::trim) == Some("0"))
}

/// GitHub errors carry `{"message": "..."}`; fall back to the raw body
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
