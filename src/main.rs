//! LaserCalc - Manufacturing cost calculators with a blog admin backend

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lasercalc::{
    api::{self, AppState},
    config::Config,
    db::{migrations, Database},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lasercalc=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LaserCalc backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.auth.admin_token.is_empty() {
        tracing::warn!("No admin token configured, admin endpoints are disabled");
    }

    // Initialize database
    let db = Database::from_config(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    migrations::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations completed");

    // Build application state and router
    let cors_origin = config.server.cors_origin.clone();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(db, config);
    let app = api::build_router(state, &cors_origin);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
