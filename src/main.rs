use anyhow::Context;

use ecotrack_api::config::{self, Environment};
use ecotrack_api::database::DatabaseManager;
use ecotrack_api::{app, init_tracing, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    init_tracing("ecotrack_api=info,tower_http=info");

    let config = config::config().clone();
    tracing::info!("Starting EcoTrack API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            tracing::error!("JWT_SECRET is not set; login and protected routes will fail");
        } else {
            tracing::warn!("JWT_SECRET is not set for {:?}", config.environment);
        }
    }
    if config.environment == Environment::Development {
        tracing::debug!("Configuration: {}", serde_json::to_string(&config).unwrap_or_default());
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = app(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("EcoTrack API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
