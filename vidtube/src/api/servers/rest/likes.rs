//! Like toggles. Each toggle flips the caller's like on one target and
//! reports whether the like exists afterwards.

use axum::extract::{Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, FeedQuery, LikeToggleResponse};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::AuthenticatedAccount;
use crate::modules::error::parse_id;
use crate::modules::feed::{Page, VideoCard};
use crate::modules::relations::{RelationKind, TargetKind};

async fn toggle(
    state: &AppState,
    auth: &AuthenticatedAccount,
    raw_id: &str,
    kind: TargetKind,
) -> Result<ApiResponse<LikeToggleResponse>, ApiError> {
    let label = match kind {
        TargetKind::Video => "video",
        TargetKind::Comment => "comment",
        TargetKind::Post => "tweet",
    };
    let target = parse_id(label, raw_id)?;
    let toggled = state
        .platform
        .toggles()
        .toggle(auth.account_id, target, RelationKind::Like(kind))
        .await?;

    let message = if toggled.active {
        "Liked successfully"
    } else {
        "Unliked successfully"
    };
    Ok(ApiResponse::ok(
        LikeToggleResponse {
            is_liked: toggled.active,
        },
        message,
    ))
}

/// POST /api/v1/likes/toggle/v/{video_id}
pub async fn toggle_video(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<LikeToggleResponse>, ApiError> {
    toggle(&state, &auth, &video_id, TargetKind::Video).await
}

/// POST /api/v1/likes/toggle/c/{comment_id}
pub async fn toggle_comment(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<LikeToggleResponse>, ApiError> {
    toggle(&state, &auth, &comment_id, TargetKind::Comment).await
}

/// POST /api/v1/likes/toggle/t/{tweet_id}
pub async fn toggle_tweet(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<LikeToggleResponse>, ApiError> {
    toggle(&state, &auth, &tweet_id, TargetKind::Post).await
}

/// GET /api/v1/likes/videos
pub async fn liked_videos(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<VideoCard>>, ApiError> {
    let request = params.page_request(state.platform.feed_limits)?;
    let page = state
        .platform
        .feed()
        .liked_videos(auth.account_id, request)
        .await?;
    Ok(ApiResponse::ok(page, "Liked videos fetched successfully"))
}
