// handlers/protected/whoami.rs - GET /users/me

use axum::{extract::State, Extension};

use crate::database::models::UserResponse;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// The account behind the bearer token. A token outliving its user is a 404.
pub async fn whoami(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserResponse> {
    let user = state
        .users()
        .get_by_email(&auth_user.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user.into()))
}
