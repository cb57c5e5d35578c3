// handlers/public/emissions.rs - GET /emissions, GET /emissions/:id

use axum::extract::State;

use crate::database::models::Emission;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::EmissionQuery;
use crate::state::AppState;

/// Filters: `country`, `sector`, `date_from`, `date_to`; plus `skip`, `limit`, `order_by`
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<EmissionQuery>) -> ApiResult<Vec<Emission>> {
    let page = state.page(query.skip, query.limit)?;
    let rows = state.emissions().list(&query, page).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Emission> {
    Ok(ApiResponse::success(state.emissions().get(id).await?))
}
