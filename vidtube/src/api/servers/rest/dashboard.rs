//! Channel dashboard: the authenticated account's own channel, or any
//! channel by id.

use axum::extract::{Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, FeedQuery};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::AuthenticatedAccount;
use crate::modules::error::parse_id;
use crate::modules::feed::{ChannelStats, Page, VideoCard};

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
) -> Result<ApiResponse<ChannelStats>, ApiError> {
    let stats = state
        .platform
        .feed()
        .channel_stats(auth.account_id, auth.account_id)
        .await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

/// GET /api/v1/dashboard/stats/{channel_id}
///
/// Drafts are left out unless the caller owns the channel.
pub async fn channel_stats(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<ChannelStats>, ApiError> {
    let channel_id = parse_id("channel", &channel_id)?;
    let stats = state
        .platform
        .feed()
        .channel_stats(channel_id, auth.account_id)
        .await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

/// GET /api/v1/dashboard/videos
///
/// Every video of the channel, drafts included.
pub async fn videos(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<VideoCard>>, ApiError> {
    let request = params.page_request(state.platform.feed_limits)?;
    let page = state
        .platform
        .feed()
        .channel_videos(auth.account_id, Some(auth.account_id), request)
        .await?;
    Ok(ApiResponse::ok(page, "Channel videos fetched successfully"))
}

/// GET /api/v1/dashboard/videos/{channel_id}
pub async fn channel_videos(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(channel_id): Path<String>,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<VideoCard>>, ApiError> {
    let channel_id = parse_id("channel", &channel_id)?;
    let request = params.page_request(state.platform.feed_limits)?;
    let page = state
        .platform
        .feed()
        .channel_videos(channel_id, Some(auth.account_id), request)
        .await?;
    Ok(ApiResponse::ok(page, "Channel videos fetched successfully"))
}
