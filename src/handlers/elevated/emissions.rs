// handlers/elevated/emissions.rs - POST /emissions, PUT/DELETE /emissions/:id

use axum::extract::State;

use crate::database::models::{Emission, EmissionCreate, EmissionUpdate};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, ApiJson(payload): ApiJson<EmissionCreate>) -> ApiResult<Emission> {
    Ok(ApiResponse::created(state.emissions().create(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<EmissionUpdate>,
) -> ApiResult<Emission> {
    Ok(ApiResponse::success(state.emissions().update(id, payload).await?))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.emissions().delete(id).await?;
    Ok(ApiResponse::no_content())
}
