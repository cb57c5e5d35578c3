// handlers/elevated/air_quality.rs - POST /air-quality, PUT/DELETE /air-quality/:id

use axum::extract::State;

use crate::database::models::{AirQuality, AirQualityCreate, AirQualityUpdate};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, ApiJson(payload): ApiJson<AirQualityCreate>) -> ApiResult<AirQuality> {
    Ok(ApiResponse::created(state.air_quality().create(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AirQualityUpdate>,
) -> ApiResult<AirQuality> {
    Ok(ApiResponse::success(state.air_quality().update(id, payload).await?))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.air_quality().delete(id).await?;
    Ok(ApiResponse::no_content())
}
