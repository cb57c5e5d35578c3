// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "EcoTrack API",
            "version": version,
            "description": "CO2 emissions and air quality tracking backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "emissions": "/emissions[/:id] (read public, write admin)",
                "air_quality": "/air-quality[/:id] (read public, write admin)",
                "sources": "/sources[/:id] (read public, write admin)",
                "users": "/users/register, /users/login (public), /users/me (authenticated), /users[/:id] (admin)",
                "stats": "/stats/air/averages, /stats/co2/trend (public)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
