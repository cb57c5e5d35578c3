// handlers/public/sources.rs - GET /sources, GET /sources/:id

use axum::extract::State;

use crate::database::models::Source;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::ListQuery;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<Source>> {
    let page = state.page(query.skip, query.limit)?;
    Ok(ApiResponse::success(state.sources().list(&query, page).await?))
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Source> {
    Ok(ApiResponse::success(state.sources().get(id).await?))
}
