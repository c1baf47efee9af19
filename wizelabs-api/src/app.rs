/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use wizelabs_api::{app::AppState, config::Config, oauth::OAuthClient};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let oauth = OAuthClient::new(config.oauth.clone())?;
/// let app = wizelabs_api::app::build_router(AppState::new(pool, config, oauth));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_session, security::SecurityHeadersLayer},
    oauth::OAuthClient,
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub oauth: OAuthClient,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, oauth: OAuthClient) -> Self {
        Self {
            db,
            config: Arc::new(config),
            oauth,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /health                      public
/// /auth/{login,callback,       public (OAuth flow and session management)
///        refresh,logout}
/// /v1/...                      session required
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", get(routes::auth::login))
        .route("/callback", get(routes::auth::callback))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout));

    let v1_routes = Router::new()
        .route("/me", get(routes::me::me))
        // Profiles
        .route("/profiles", get(routes::profiles::list_profiles))
        .route(
            "/profiles/:id",
            get(routes::profiles::get_profile).patch(routes::profiles::update_profile),
        )
        .route(
            "/profiles/:id/github",
            put(routes::profiles::link_github).delete(routes::profiles::unlink_github),
        )
        .route("/profiles/:id/github/activity", get(routes::profiles::github_activity))
        // Projects
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/projects/:id/votes",
            get(routes::votes::get_votes).post(routes::votes::toggle_vote),
        )
        .route(
            "/projects/:id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/projects/:id/members/:profile_id",
            patch(routes::members::update_member).delete(routes::members::remove_member),
        )
        .route(
            "/projects/:id/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/comments/:id",
            patch(routes::comments::update_comment).delete(routes::comments::delete_comment),
        )
        .route(
            "/projects/:id/resources",
            get(routes::resources::list_resources).post(routes::resources::create_resource),
        )
        .route("/resources/:id", delete(routes::resources::delete_resource))
        .route(
            "/projects/:id/objectives",
            get(routes::objectives::list_objectives).post(routes::objectives::create_objective),
        )
        .route(
            "/objectives/:id",
            patch(routes::objectives::update_objective)
                .delete(routes::objectives::delete_objective),
        )
        .route(
            "/projects/:id/stages",
            get(routes::stages::list_stages).post(routes::stages::create_stage),
        )
        .route("/stages/:id", delete(routes::stages::delete_stage))
        .route("/stages/:id/tasks", post(routes::stages::create_task))
        .route(
            "/tasks/:id",
            patch(routes::stages::update_task).delete(routes::stages::delete_task),
        )
        .route(
            "/projects/:id/github",
            get(routes::github::list_repos).post(routes::github::link_repo),
        )
        .route("/projects/:id/github/activity", get(routes::github::project_activity))
        .route("/projects/:id/github/releases", get(routes::github::project_releases))
        .route("/github/:id", delete(routes::github::unlink_repo))
        // Internship pipeline
        .route(
            "/applicants",
            get(routes::applicants::list_applicants).post(routes::applicants::create_applicant),
        )
        .route("/applicants/:id", get(routes::applicants::get_applicant))
        .route("/applicants/:id/status", patch(routes::applicants::update_status))
        .route("/applicants/:id/assignment", patch(routes::applicants::update_assignment))
        // Taxonomy
        .route(
            "/labels",
            get(routes::taxonomy::list_labels).post(routes::taxonomy::create_label),
        )
        .route(
            "/labels/:id",
            patch(routes::taxonomy::rename_label).delete(routes::taxonomy::delete_label),
        )
        .route(
            "/statuses",
            get(routes::taxonomy::list_statuses).post(routes::taxonomy::create_status),
        )
        .route(
            "/statuses/:id",
            patch(routes::taxonomy::update_status).delete(routes::taxonomy::delete_status),
        )
        .route(
            "/tiers",
            get(routes::taxonomy::list_tiers).post(routes::taxonomy::create_tier),
        )
        .route(
            "/tiers/:id",
            patch(routes::taxonomy::update_tier).delete(routes::taxonomy::delete_tier),
        )
        // Administrators
        .route(
            "/admins",
            get(routes::admins::list_admins).post(routes::admins::grant_admin),
        )
        .route("/admins/:user_id", delete(routes::admins::revoke_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
