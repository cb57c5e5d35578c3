mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn user_administration_requires_admin() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user_token = app.user_token.clone();

    let (status, _) = app.get("/users").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/users", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/users/1", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.admin(Method::GET, "/users", None).await?;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));
    Ok(())
}

#[tokio::test]
async fn admin_updates_password_and_role() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (_, body) = app.admin(Method::GET, "/users?order_by=username", None).await?;
    let testuser_id = body["data"][1]["id"].as_i64().unwrap_or_default();
    assert_eq!(body["data"][1]["username"], "testuser");
    let uri = format!("/users/{}", testuser_id);

    let (status, body) = app
        .admin(Method::PUT, &uri, Some(json!({"password": "rotated-pass", "role": "admin"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["email"], common::USER_EMAIL);

    let (status, _) = app.post_form("/users/login", "email=user%40ecotrack.com&password=user123").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.post_form("/users/login", "email=user%40ecotrack.com&password=rotated-pass").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn update_rechecks_uniqueness_against_other_users() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (_, body) = app.admin(Method::GET, "/users?order_by=username", None).await?;
    let testuser_id = body["data"][1]["id"].as_i64().unwrap_or_default();
    let uri = format!("/users/{}", testuser_id);

    let (status, body) = app.admin(Method::PUT, &uri, Some(json!({"email": common::ADMIN_EMAIL}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with this email already exists");

    // Re-submitting the user's own email is fine
    let (status, _) = app.admin(Method::PUT, &uri, Some(json!({"email": common::USER_EMAIL}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_user() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (_, body) = app
        .send(
            Method::POST,
            "/users/register",
            None,
            Some(json!({"username": "temp", "email": "temp@ecotrack.com", "password": "pw"})),
        )
        .await?;
    let uri = format!("/users/{}", body["data"]["id"]);

    let (status, _) = app.admin(Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.admin(Method::GET, &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    Ok(())
}
