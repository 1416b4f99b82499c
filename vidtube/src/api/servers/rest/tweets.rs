//! Post ("tweet") handlers.

use axum::extract::{Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, ContentRequest, FeedQuery, JsonBody, PostRecord};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::{AuthenticatedAccount, CurrentViewer};
use crate::modules::error::parse_id;
use crate::modules::feed::{Page, PostCard};

/// GET /api/v1/tweets?query=
pub async fn search(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<PostCard>>, ApiError> {
    let request = params.page_request(state.platform.feed_limits)?;
    let page = state
        .platform
        .feed()
        .search_posts(params.query.as_deref(), viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "Tweets fetched successfully"))
}

/// POST /api/v1/tweets
pub async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    JsonBody(payload): JsonBody<ContentRequest>,
) -> Result<ApiResponse<PostRecord>, ApiError> {
    let post = state
        .platform
        .posts()
        .create(auth.account_id, &payload.content)
        .await?;
    Ok(ApiResponse::created(post.into(), "Tweet created successfully"))
}

/// GET /api/v1/tweets/user/{user_id}
pub async fn by_user(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(user_id): Path<String>,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<PostCard>>, ApiError> {
    let user_id = parse_id("user", &user_id)?;
    let request = params.page_request(state.platform.feed_limits)?;

    let page = state
        .platform
        .feed()
        .channel_posts(user_id, viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "User tweets fetched successfully"))
}

/// PATCH /api/v1/tweets/{tweet_id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(tweet_id): Path<String>,
    JsonBody(payload): JsonBody<ContentRequest>,
) -> Result<ApiResponse<PostRecord>, ApiError> {
    let tweet_id = parse_id("tweet", &tweet_id)?;
    let post = state
        .platform
        .posts()
        .update(tweet_id, auth.account_id, &payload.content)
        .await?;
    Ok(ApiResponse::ok(post.into(), "Tweet updated successfully"))
}

/// DELETE /api/v1/tweets/{tweet_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let tweet_id = parse_id("tweet", &tweet_id)?;
    state
        .platform
        .posts()
        .delete(tweet_id, auth.account_id)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "deleted": tweet_id }),
        "Tweet deleted successfully",
    ))
}
