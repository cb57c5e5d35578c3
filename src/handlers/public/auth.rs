// handlers/public/auth.rs - POST /users/register, POST /users/login

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, Claims};
use crate::database::models::{UserCreate, UserResponse};
use crate::error::ApiError;
use crate::middleware::{ApiForm, ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds
    pub expires_in: i64,
}

/// POST /users/register - create an account; `role` defaults to `user`
pub async fn register(State(state): State<AppState>, ApiJson(payload): ApiJson<UserCreate>) -> ApiResult<UserResponse> {
    let user = state.users().create(payload).await?;
    Ok(ApiResponse::created(user.into()))
}

/// POST /users/login - exchange form-encoded credentials for a bearer token
pub async fn login(State(state): State<AppState>, ApiForm(form): ApiForm<LoginForm>) -> ApiResult<TokenResponse> {
    let Some(user) = state.users().authenticate(&form.email, &form.password).await? else {
        tracing::warn!("Failed login for {}", form.email);
        return Err(ApiError::unauthorized("Incorrect email or password"));
    };

    let security = &state.config.security;
    let claims = Claims::new(&user.email, &user.role, security.jwt_expiry_minutes);
    let access_token = generate_jwt(&claims, &security.jwt_secret)?;

    tracing::info!("User {} logged in", user.email);
    Ok(ApiResponse::success(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: security.jwt_expiry_minutes * 60,
    }))
}
