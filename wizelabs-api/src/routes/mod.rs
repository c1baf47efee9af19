/// API route handlers, one module per resource
///
/// - `health`: liveness and database status
/// - `auth`: OAuth login flow, token refresh, logout
/// - `me`: the signed-in user
/// - `profiles`: employee directory and GitHub links
/// - `projects`, `votes`, `members`, `comments`, `resources`,
///   `objectives`, `stages`, `github`: projects and their parts
/// - `applicants`: internship pipeline
/// - `taxonomy`: labels, statuses and innovation tiers
/// - `admins`: administrator grants

pub mod admins;
pub mod applicants;
pub mod auth;
pub mod comments;
pub mod github;
pub mod health;
pub mod me;
pub mod members;
pub mod objectives;
pub mod profiles;
pub mod projects;
pub mod resources;
pub mod stages;
pub mod taxonomy;
pub mod votes;
