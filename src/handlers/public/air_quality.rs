// handlers/public/air_quality.rs - GET /air-quality, GET /air-quality/:id

use axum::extract::State;

use crate::database::models::AirQuality;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::AirQualityQuery;
use crate::state::AppState;

/// `city` matches any part of the name, case-insensitively
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<AirQualityQuery>) -> ApiResult<Vec<AirQuality>> {
    let page = state.page(query.skip, query.limit)?;
    let rows = state.air_quality().list(&query, page).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<AirQuality> {
    Ok(ApiResponse::success(state.air_quality().get(id).await?))
}
