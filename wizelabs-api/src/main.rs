//! # Wizelabs API Server
//!
//! Serves the JSON API behind the Wizelabs innovation portal.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p wizelabs-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured logs in deployed environments.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizelabs_api::{
    app::{build_router, AppState},
    config::Config,
    oauth::OAuthClient,
};
use wizelabs_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wizelabs_api=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Wizelabs API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(
        DatabaseConfig::new(config.database.url.clone())
            .with_max_connections(config.database.max_connections),
    )
    .await?;
    run_migrations(&pool).await?;

    let oauth = OAuthClient::new(config.oauth.clone())?;
    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, oauth));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
