// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use portal_core::kernel::{start_scheduler, ServerDeps};
use portal_core::server::{build_app, AppState};
use portal_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,portal_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting coaching portal API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(app_env = ?config.app_env, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let deps = Arc::new(ServerDeps::from_config(&config, pool));

    // Dropping the scheduler stops its jobs
    let _scheduler = start_scheduler(deps.clone())
        .await
        .context("Failed to start scheduled tasks")?;

    let app = build_app(AppState::new(deps, config.app_env), &config.allowed_origins)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
