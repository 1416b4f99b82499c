//! Video handlers: listing, detail, and owner-side writes.

use axum::extract::{Multipart, Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, DeletionResponse, FeedQuery, FormData, VideoRecord};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::{AuthenticatedAccount, CurrentViewer};
use crate::modules::content::{NewVideo, VideoChanges};
use crate::modules::error::parse_id;
use crate::modules::feed::{Page, VideoCard, VideoDetail};

/// GET /api/v1/videos?page=&limit=&sortType=&query=&userId=
pub async fn list(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<VideoCard>>, ApiError> {
    let request = params.page_request(state.platform.feed_limits)?;
    let owner = params
        .user_id
        .as_deref()
        .map(|raw| parse_id("user", raw))
        .transpose()?;

    let page = state
        .platform
        .feed()
        .search_videos(params.query.as_deref(), owner, viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

/// POST /api/v1/videos
///
/// Multipart fields: `title`, `description`, `videoFile`, `thumbnail`.
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    multipart: Multipart,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let new = NewVideo {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        video: form.require_file("videoFile")?,
        thumbnail: form.require_file("thumbnail")?,
    };

    let video = state.platform.videos().publish(auth.account_id, new).await?;
    Ok(ApiResponse::created(video.into(), "Video uploaded successfully"))
}

/// GET /api/v1/videos/{video_id}
pub async fn detail(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoDetail>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let detail = state.platform.feed().video_detail(video_id, viewer).await?;
    Ok(ApiResponse::ok(detail, "Video fetched successfully"))
}

/// PATCH /api/v1/videos/{video_id}
///
/// Multipart fields, all optional: `title`, `description`, `thumbnail`.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let mut form = FormData::read(multipart).await?;
    let changes = VideoChanges {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        thumbnail: form.take_file("thumbnail"),
    };

    let video = state
        .platform
        .videos()
        .update(video_id, auth.account_id, changes)
        .await?;
    Ok(ApiResponse::ok(video.into(), "Video updated successfully"))
}

/// DELETE /api/v1/videos/{video_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<DeletionResponse>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let report = state
        .platform
        .videos()
        .delete(video_id, auth.account_id)
        .await?;

    let response = DeletionResponse {
        deleted: video_id,
        complete: report.is_complete(),
    };
    Ok(ApiResponse::ok(response, "Video deleted successfully"))
}

/// PATCH /api/v1/videos/toggle/publish/{video_id}
pub async fn toggle_publish(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let video_id = parse_id("video", &video_id)?;
    let video = state
        .platform
        .videos()
        .toggle_publish(video_id, auth.account_id)
        .await?;
    Ok(ApiResponse::ok(
        video.into(),
        "Video publish status toggled successfully",
    ))
}
