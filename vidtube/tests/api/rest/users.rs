//! Integration tests for account and channel endpoints.
//!
//! Tests cover:
//! - POST /api/v1/users/register
//! - POST /api/v1/users/login, /logout, /refresh-token
//! - GET /api/v1/users/current-user
//! - PATCH /api/v1/users/update-account
//! - GET /api/v1/users/c/{handle}
//! - GET /api/v1/users/history

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::helpers::*;
use crate::bootstrap::init::{
    TEST_PASSWORD, create_account, create_account_with_token, create_video, login,
    setup_test_server,
};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_created_account() {
    let server = setup_test_server().await;

    let (status, body) = multipart_request(
        &server.router,
        Method::POST,
        "/api/v1/users/register",
        None,
        &[
            Part::Text("username", "Alice"),
            Part::Text("email", "Alice@Example.com"),
            Part::Text("fullname", "Alice Liddell"),
            Part::Text("password", "secret-pass"),
            Part::File("avatar", "avatar.png", b"avatar bytes"),
        ],
    )
    .await;

    assert_success(status, &body, StatusCode::CREATED);
    assert_eq!(body["data"]["handle"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["displayName"], "Alice Liddell");
    assert!(
        body["data"]["avatarUrl"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8080/media/image/")
    );
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_without_avatar_is_rejected() {
    let server = setup_test_server().await;

    let (status, body) = multipart_request(
        &server.router,
        Method::POST,
        "/api/v1/users/register",
        None,
        &[
            Part::Text("username", "bob"),
            Part::Text("email", "bob@example.com"),
            Part::Text("fullname", "Bob"),
            Part::Text("password", "secret-pass"),
        ],
    )
    .await;

    assert_failure(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_register_duplicate_handle_conflicts() {
    let server = setup_test_server().await;
    create_account(&server.platform, "carol").await;

    let (status, body) = multipart_request(
        &server.router,
        Method::POST,
        "/api/v1/users/register",
        None,
        &[
            Part::Text("username", "carol"),
            Part::Text("email", "other@example.com"),
            Part::Text("fullname", "Carol Again"),
            Part::Text("password", "secret-pass"),
            Part::File("avatar", "avatar.png", b"avatar bytes"),
        ],
    )
    .await;

    assert_failure(status, &body, StatusCode::CONFLICT, "CONFLICT");
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_login_by_email_and_fetch_current_user() {
    let server = setup_test_server().await;
    create_account(&server.platform, "dave").await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/login",
        None,
        json!({ "email": "dave@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_success(status, &body, StatusCode::OK);

    let token = body["data"]["accessToken"].as_str().unwrap().to_string();
    assert!(body["data"]["refreshToken"].is_string());

    let (status, body) =
        get_request_auth(&server.router, "/api/v1/users/current-user", Some(&token)).await;
    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["handle"], "dave");
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let server = setup_test_server().await;
    create_account(&server.platform, "erin").await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/login",
        None,
        json!({ "username": "erin", "password": "wrong" }),
    )
    .await;

    assert_failure(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_unknown_user_is_not_found() {
    let server = setup_test_server().await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/login",
        None,
        json!({ "username": "ghost", "password": TEST_PASSWORD }),
    )
    .await;

    assert_failure(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let server = setup_test_server().await;

    let (status, body) = get_request(&server.router, "/api/v1/users/current-user").await;
    assert_failure(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let (status, body) =
        get_request_auth(&server.router, "/api/v1/users/current-user", Some("garbage")).await;
    assert_failure(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_token_rotates_and_logout_revokes() {
    let server = setup_test_server().await;
    create_account(&server.platform, "frank").await;
    let session = login(&server.platform, "frank").await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/refresh-token",
        None,
        json!({ "refreshToken": session.refresh_token }),
    )
    .await;
    assert_success(status, &body, StatusCode::OK);
    let rotated = body["data"]["refreshToken"].as_str().unwrap().to_string();
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, session.refresh_token);

    // The superseded token is no longer accepted.
    let (status, _) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/refresh-token",
        None,
        json!({ "refreshToken": session.refresh_token }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        empty_request(&server.router, Method::POST, "/api/v1/users/logout", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/refresh-token",
        None,
        json!({ "refreshToken": rotated }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let server = setup_test_server().await;
    create_account(&server.platform, "gina").await;
    let session = login(&server.platform, "gina").await;

    let (status, _) = get_request_auth(
        &server.router,
        "/api/v1/users/current-user",
        Some(&session.refresh_token),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_then_login_with_new_one() {
    let server = setup_test_server().await;
    let (_, token) = create_account_with_token(&server.platform, "hank").await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/change-password",
        Some(&token),
        json!({ "oldPassword": "not-it", "newPassword": "fresh-pass" }),
    )
    .await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");

    let (status, _) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/change-password",
        Some(&token),
        json!({ "oldPassword": TEST_PASSWORD, "newPassword": "fresh-pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let session = server.platform.accounts().login("hank", "fresh-pass").await;
    assert!(session.is_ok());
}

#[tokio::test]
async fn test_update_account_details() {
    let server = setup_test_server().await;
    let (_, token) = create_account_with_token(&server.platform, "iris").await;

    let (status, body) = json_request(
        &server.router,
        Method::PATCH,
        "/api/v1/users/update-account",
        Some(&token),
        json!({ "fullname": "Iris West" }),
    )
    .await;

    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["displayName"], "Iris West");
    assert_eq!(body["data"]["email"], "iris@example.com");
}

#[tokio::test]
async fn test_update_avatar_replaces_locator() {
    let server = setup_test_server().await;
    let account = create_account(&server.platform, "jade").await;
    let token = login(&server.platform, "jade").await.access_token;

    let (status, body) = multipart_request(
        &server.router,
        Method::PATCH,
        "/api/v1/users/avatar",
        Some(&token),
        &[Part::File("avatar", "new.png", b"new avatar")],
    )
    .await;

    assert_success(status, &body, StatusCode::OK);
    assert_ne!(body["data"]["avatarUrl"], account.avatar_url.as_str());
}

// ============================================================================
// Channels
// ============================================================================

#[tokio::test]
async fn test_channel_profile_hides_email_from_others() {
    let server = setup_test_server().await;
    let (_, own_token) = create_account_with_token(&server.platform, "kira").await;
    let (_, other_token) = create_account_with_token(&server.platform, "liam").await;

    let (status, body) =
        get_request_auth(&server.router, "/api/v1/users/c/kira", Some(&own_token)).await;
    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["email"], "kira@example.com");

    let (_, body) =
        get_request_auth(&server.router, "/api/v1/users/c/kira", Some(&other_token)).await;
    assert!(body["data"].get("email").is_none());
    assert_eq!(body["data"]["subscribersCount"], 0);
    assert_eq!(body["data"]["isSubscribed"], false);

    let (status, body) = get_request(&server.router, "/api/v1/users/c/nobody").await;
    assert_failure(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_watch_history_lists_viewed_videos() {
    let server = setup_test_server().await;
    let owner = create_account(&server.platform, "maya").await;
    let (_, token) = create_account_with_token(&server.platform, "nico").await;
    let video = create_video(&server.platform, owner.id, "First", true).await;

    let (status, _) = get_request_auth(
        &server.router,
        &format!("/api/v1/videos/{}", video.id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        get_request_auth(&server.router, "/api/v1/users/history", Some(&token)).await;
    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], video.id.to_string());
}

#[tokio::test]
async fn test_login_without_password_uses_error_envelope() {
    let server = setup_test_server().await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        "/api/v1/users/login",
        None,
        json!({ "username": "nobody" }),
    )
    .await;

    assert_failure(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");
    assert_eq!(body["statusCode"], 400);
}
