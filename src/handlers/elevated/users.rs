// handlers/elevated/users.rs - GET /users, GET/PUT/DELETE /users/:id

use axum::extract::State;

use crate::database::models::{UserResponse, UserUpdate};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::ListQuery;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<UserResponse>> {
    let page = state.page(query.skip, query.limit)?;
    let users = state.users().list(&query, page).await?;
    Ok(ApiResponse::success(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<UserResponse> {
    Ok(ApiResponse::success(state.users().get(id).await?.into()))
}

/// Partial update; a new password is hashed before it is stored
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> ApiResult<UserResponse> {
    Ok(ApiResponse::success(state.users().update(id, payload).await?.into()))
}

pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    state.users().delete(id).await?;
    Ok(ApiResponse::no_content())
}
