use axum::extract::{Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, CommentRecord, ContentRequest, FeedQuery, JsonBody};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::{AuthenticatedAccount, CurrentViewer};
use crate::modules::error::parse_id;
use crate::modules::feed::{CommentCard, Page};

/// GET /api/v1/comments/{video_id}
pub async fn list(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(video_id): Path<String>,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<CommentCard>>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let request = params.page_request(state.platform.feed_limits)?;

    let page = state
        .platform
        .feed()
        .video_comments(video_id, viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "Comments fetched successfully"))
}

/// POST /api/v1/comments/{video_id}
pub async fn add(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(video_id): Path<String>,
    JsonBody(payload): JsonBody<ContentRequest>,
) -> Result<ApiResponse<CommentRecord>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let comment = state
        .platform
        .comments()
        .add(video_id, auth.account_id, &payload.content)
        .await?;
    Ok(ApiResponse::created(comment.into(), "Comment added successfully"))
}

/// PATCH /api/v1/comments/c/{comment_id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(comment_id): Path<String>,
    JsonBody(payload): JsonBody<ContentRequest>,
) -> Result<ApiResponse<CommentRecord>, ApiError> {
    let comment_id = parse_id("comment", &comment_id)?;
    let comment = state
        .platform
        .comments()
        .update(comment_id, auth.account_id, &payload.content)
        .await?;
    Ok(ApiResponse::ok(comment.into(), "Comment updated successfully"))
}

/// DELETE /api/v1/comments/c/{comment_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let comment_id = parse_id("comment", &comment_id)?;
    state
        .platform
        .comments()
        .delete(comment_id, auth.account_id)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "deleted": comment_id }),
        "Comment deleted successfully",
    ))
}
