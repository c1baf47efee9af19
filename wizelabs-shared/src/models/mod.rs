/// Database models for Wizelabs
///
/// Each module owns one table (or a tight group of tables) and exposes its
/// operations as associated functions taking a `&PgPool`.
///
/// # Models
///
/// - `user`: login identities and their role
/// - `profile`: employee directory synced from the warehouse
/// - `label`, `project_status`, `innovation_tier`: admin taxonomy
/// - `project`: innovation proposals and their labels
/// - `project_member`: who works on a project
/// - `vote`: one vote per profile per project
/// - `comment`: threaded project discussion
/// - `resource`, `objective`, `stage`: project planning artefacts
/// - `applicant`: internship pipeline
/// - `github`: linked GitHub accounts/repositories and ingested activity

pub mod applicant;
pub mod comment;
pub mod github;
pub mod innovation_tier;
pub mod label;
pub mod objective;
pub mod profile;
pub mod project;
pub mod project_member;
pub mod project_status;
pub mod resource;
pub mod stage;
pub mod user;
pub mod vote;

use serde::{Deserialize, Serialize};

/// Canonical form of an email address: trimmed and lower-cased
///
/// Every email column stores this form so lookups can use plain equality.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Offset pagination parameters shared by list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size, clamped to `MAX_PER_PAGE`
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

pub const MAX_PER_PAGE: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    25
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE) as i64
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit()
    }
}

/// Turns free text into an `ILIKE` pattern, escaping wildcards
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
