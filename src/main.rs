use std::sync::Arc;

use anyhow::Context;
use reflect_api::app::{app, AppState};
use reflect_api::config::config;
use reflect_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config();

    let default_filter = if config.api.enable_request_logging {
        "reflect_api=info,tower_http=info"
    } else {
        "reflect_api=info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Reflect API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match &config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await.context("failed to connect to database")?;
            DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    let app = app(AppState::new(store, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Reflect API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
