mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "EcoTrack API");
    Ok(())
}

#[tokio::test]
async fn register_returns_created_user_without_password() -> Result<()> {
    let app = TestApp::spawn().await?;

    let payload = json!({"username": "carol", "email": "carol@ecotrack.com", "password": "pa55word"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "carol");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"]["id"].as_i64().is_some());
    assert!(body["data"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn register_conflicts_report_email_first() -> Result<()> {
    let app = TestApp::spawn().await?;

    let payload = json!({"username": "admin", "email": common::ADMIN_EMAIL, "password": "x"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with this email already exists");

    let payload = json!({"username": "admin", "email": "fresh@ecotrack.com", "password": "x"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with this username already exists");
    Ok(())
}

#[tokio::test]
async fn email_domain_is_case_insensitive() -> Result<()> {
    let app = TestApp::spawn().await?;

    let payload = json!({"username": "admin2", "email": "admin@EcoTrack.COM", "password": "x"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with this email already exists");

    let payload = json!({"username": "dave", "email": "dave@ECOTRACK.com", "password": "pa55word"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "dave@ecotrack.com");

    let (status, _) = app.post_form("/users/login", "email=dave%40EcoTrack.com&password=pa55word").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_validates_fields() -> Result<()> {
    let app = TestApp::spawn().await?;

    let payload = json!({"username": "ab", "email": "not-an-email", "password": "x", "role": "root"});
    let (status, body) = app.send(Method::POST, "/users/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["username", "email", "role"] {
        assert!(body["field_errors"].get(field).is_some(), "missing field error for {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = format!("email={}&password={}", "admin%40ecotrack.com", common::ADMIN_PASSWORD);
    let (status, body) = app.post_form("/users/login", &form).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["expires_in"], 3600);

    let token = body["data"]["access_token"].as_str().unwrap_or_default().to_string();
    let (status, me) = app.send(Method::GET, "/users/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], common::ADMIN_EMAIL);
    assert_eq!(me["data"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.post_form("/users/login", "email=admin%40ecotrack.com&password=wrong").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect email or password");

    let (status, body) = app.post_form("/users/login", "email=ghost%40ecotrack.com&password=admin123").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect email or password");
    Ok(())
}

#[tokio::test]
async fn me_requires_valid_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/users/me").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.send(Method::GET, "/users/me", Some("garbage.token.here"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = app.user_token.clone();
    let (status, body) = app.send(Method::GET, "/users/me", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "testuser");
    Ok(())
}
