use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use super::helpers::*;
use crate::bootstrap::init::{
    create_account, create_account_with_token, create_video, setup_test_server,
};

#[tokio::test]
async fn test_empty_comment_page_is_success() {
    let server = setup_test_server().await;
    let owner = create_account(&server.platform, "owner").await;
    let video = create_video(&server.platform, owner.id, "Quiet", true).await;

    let (status, body) =
        get_request(&server.router, &format!("/api/v1/comments/{}", video.id)).await;

    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_comments_on_missing_video_are_not_found() {
    let server = setup_test_server().await;
    let (_, token) = create_account_with_token(&server.platform, "viewer").await;
    let missing = Uuid::new_v4();

    let (status, _) = get_request(&server.router, &format!("/api/v1/comments/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        &format!("/api/v1/comments/{missing}"),
        Some(&token),
        json!({ "content": "Hello?" }),
    )
    .await;
    assert_failure(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_add_list_update_delete_comment() {
    let server = setup_test_server().await;
    let owner = create_account(&server.platform, "owner").await;
    let (_, token) = create_account_with_token(&server.platform, "fan").await;
    let video = create_video(&server.platform, owner.id, "Popular", true).await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        &format!("/api/v1/comments/{}", video.id),
        Some(&token),
        json!({ "content": "  Great video  " }),
    )
    .await;
    assert_success(status, &body, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "Great video");
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = get_request(&server.router, &format!("/api/v1/comments/{}", video.id)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["owner"]["handle"], "fan");

    let (status, body) = json_request(
        &server.router,
        Method::PATCH,
        &format!("/api/v1/comments/c/{comment_id}"),
        Some(&token),
        json!({ "content": "Edited" }),
    )
    .await;
    assert_success(status, &body, StatusCode::OK);
    assert_eq!(body["data"]["content"], "Edited");

    let (status, _) = empty_request(
        &server.router,
        Method::DELETE,
        &format!("/api/v1/comments/c/{comment_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_request(&server.router, &format!("/api/v1/comments/{}", video.id)).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let server = setup_test_server().await;
    let owner = create_account(&server.platform, "owner").await;
    let (_, token) = create_account_with_token(&server.platform, "fan").await;
    let video = create_video(&server.platform, owner.id, "Popular", true).await;

    let (status, body) = json_request(
        &server.router,
        Method::POST,
        &format!("/api/v1/comments/{}", video.id),
        Some(&token),
        json!({ "content": "   " }),
    )
    .await;

    assert_failure(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_only_author_edits_comment() {
    let server = setup_test_server().await;
    let owner = create_account(&server.platform, "owner").await;
    let (author_id, _) = create_account_with_token(&server.platform, "author").await;
    let (_, other) = create_account_with_token(&server.platform, "other").await;
    let video = create_video(&server.platform, owner.id, "Popular", true).await;
    let comment = server
        .platform
        .comments()
        .add(video.id, author_id, "Mine")
        .await
        .unwrap();

    let (status, body) = json_request(
        &server.router,
        Method::PATCH,
        &format!("/api/v1/comments/c/{}", comment.id),
        Some(&other),
        json!({ "content": "Hijacked" }),
    )
    .await;
    assert_failure(status, &body, StatusCode::FORBIDDEN, "FORBIDDEN");

    let (status, _) = empty_request(
        &server.router,
        Method::DELETE,
        &format!("/api/v1/comments/c/{}", Uuid::new_v4()),
        Some(&other),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
