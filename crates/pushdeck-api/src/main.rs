//! Pushdeck API Server

use anyhow::Context;
use pushdeck_api::{AppState, routes};
use pushdeck_config::load_system_config;
use pushdeck_db::{JobRepo, MemoryJobRepo, PgJobRepo, create_pool, run_migrations};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("PUSHDECK_CONFIG").unwrap_or_else(|_| "pushdeck.kdl".to_string());
    let mut config = load_system_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    info!(path = %config_path, modules = config.modules.len(), "Configuration loaded");

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = Some(url);
    }

    let repo: Arc<dyn JobRepo> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Database connected");
            Arc::new(PgJobRepo::new(pool))
        }
        None => {
            warn!("No database configured, jobs are kept in memory only");
            Arc::new(MemoryJobRepo::new())
        }
    };

    let state = AppState::new(&config, repo)?;

    // Build router
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = config.server.bind;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
