// handlers/public/stats.rs - GET /stats/air/averages, GET /stats/co2/trend

use axum::extract::State;

use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::services::{AveragesQuery, PollutantAverages, TrendPoint, TrendQuery};
use crate::state::AppState;

pub async fn air_averages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AveragesQuery>,
) -> ApiResult<PollutantAverages> {
    Ok(ApiResponse::success(state.stats().air_averages(&query).await?))
}

/// `period` is `monthly` (default) or `yearly`
pub async fn co2_trend(State(state): State<AppState>, ApiQuery(query): ApiQuery<TrendQuery>) -> ApiResult<Vec<TrendPoint>> {
    Ok(ApiResponse::success(state.stats().co2_trend(&query).await?))
}
