// handlers/elevated/sources.rs - POST /sources, PUT/DELETE /sources/:id

use axum::extract::State;

use crate::database::models::{Source, SourceCreate, SourceUpdate};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, ApiJson(payload): ApiJson<SourceCreate>) -> ApiResult<Source> {
    Ok(ApiResponse::created(state.sources().create(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<SourceUpdate>,
) -> ApiResult<Source> {
    Ok(ApiResponse::success(state.sources().update(id, payload).await?))
}

/// Measurements pointing at the source keep their rows with `source_id` cleared
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.sources().delete(id).await?;
    Ok(ApiResponse::no_content())
}
