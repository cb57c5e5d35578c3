#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use ecotrack_api::auth::{generate_jwt, Claims};
use ecotrack_api::config::AppConfig;
use ecotrack_api::database::models::UserCreate;
use ecotrack_api::database::DatabaseManager;
use ecotrack_api::services::UserService;
use ecotrack_api::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@ecotrack.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const USER_EMAIL: &str = "user@ecotrack.com";
pub const USER_PASSWORD: &str = "user123";

/// Router over a private in-memory database with one admin and one user
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin_token: String,
    pub user_token: String,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let pool = DatabaseManager::memory().await?;
        let config = test_config();

        let users = UserService::new(pool.clone(), config.security.bcrypt_cost);
        for (username, email, password, role) in [
            ("admin", ADMIN_EMAIL, ADMIN_PASSWORD, "admin"),
            ("testuser", USER_EMAIL, USER_PASSWORD, "user"),
        ] {
            users
                .create(UserCreate {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    role: role.to_string(),
                })
                .await
                .context("failed to seed user")?;
        }

        let secret = &config.security.jwt_secret;
        let admin_token = generate_jwt(&Claims::new(ADMIN_EMAIL, "admin", 60), secret)?;
        let user_token = generate_jwt(&Claims::new(USER_EMAIL, "user", 60), secret)?;

        let state = AppState::new(pool, config);
        Ok(Self {
            router: app(state.clone()),
            state,
            admin_token,
            user_token,
        })
    }

    /// Send a request and decode the body as JSON (`Null` when empty)
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.dispatch(request).await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))?;
        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let token = self.admin_token.clone();
        self.send(method, uri, Some(&token), body).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }
}
