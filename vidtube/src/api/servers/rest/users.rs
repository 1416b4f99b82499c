//! Account and channel handlers.
//!
//! These handlers follow the thin controller pattern:
//! - Extract request parameters
//! - Delegate to AccountService or FeedComposer
//! - Wrap the result in the response envelope

use axum::extract::{Multipart, Path, Query, State};
use tracing::info;

use crate::api::dto::{
    ApiError, ApiResponse, ChangePasswordRequest, FeedQuery, FormData, JsonBody, LoginRequest,
    RefreshRequest, UpdateDetailsRequest,
};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::{AuthenticatedAccount, CurrentViewer};
use crate::modules::feed::{ChannelProfile, Page, VideoCard};
use crate::modules::identity::{AccountDetails, NewAccount, Session};

/// POST /api/v1/users/register
///
/// Multipart fields: `username`, `email`, `fullname`, `password`, plus an
/// `avatar` file and an optional `coverImage` file.
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<AccountDetails>, ApiError> {
    let mut form = FormData::read(multipart).await?;

    let new = NewAccount {
        handle: form.text("username").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        display_name: form.text("fullname").unwrap_or_default().to_string(),
        password: form.text("password").unwrap_or_default().to_string(),
        avatar: form.require_file("avatar")?,
        cover: form.take_file("coverImage"),
    };

    let account = state.platform.accounts().register(new).await?;
    Ok(ApiResponse::created(account, "User registered successfully"))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<ApiResponse<Session>, ApiError> {
    let identifier = payload
        .username
        .or(payload.email)
        .ok_or_else(|| ApiError::validation("username or email is required"))?;

    let session = state
        .platform
        .accounts()
        .login(&identifier, &payload.password)
        .await?;

    Ok(ApiResponse::ok(session, "User logged in successfully"))
}

/// POST /api/v1/users/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.platform.accounts().logout(auth.account_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({}), "User logged out"))
}

/// POST /api/v1/users/refresh-token
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> Result<ApiResponse<Session>, ApiError> {
    let session = state
        .platform
        .accounts()
        .refresh(&payload.refresh_token)
        .await?;
    Ok(ApiResponse::ok(session, "Access token refreshed"))
}

/// POST /api/v1/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state
        .platform
        .accounts()
        .change_password(auth.account_id, &payload.old_password, &payload.new_password)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

/// GET /api/v1/users/current-user
pub async fn current(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
) -> Result<ApiResponse<AccountDetails>, ApiError> {
    let account = state.platform.accounts().current(auth.account_id).await?;
    Ok(ApiResponse::ok(account, "Current user fetched successfully"))
}

/// PATCH /api/v1/users/update-account
pub async fn update_details(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    JsonBody(payload): JsonBody<UpdateDetailsRequest>,
) -> Result<ApiResponse<AccountDetails>, ApiError> {
    let account = state
        .platform
        .accounts()
        .update_details(
            auth.account_id,
            payload.fullname.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(account, "Account details updated successfully"))
}

/// PATCH /api/v1/users/avatar
pub async fn update_avatar(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    multipart: Multipart,
) -> Result<ApiResponse<AccountDetails>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let bytes = form.require_file("avatar")?;

    let account = state
        .platform
        .accounts()
        .update_avatar(auth.account_id, bytes)
        .await?;
    info!(account_id = %auth.account_id, "Avatar replaced");
    Ok(ApiResponse::ok(account, "Avatar image updated successfully"))
}

/// PATCH /api/v1/users/cover-image
pub async fn update_cover(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    multipart: Multipart,
) -> Result<ApiResponse<AccountDetails>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let bytes = form.require_file("coverImage")?;

    let account = state
        .platform
        .accounts()
        .update_cover(auth.account_id, bytes)
        .await?;
    Ok(ApiResponse::ok(account, "Cover image updated successfully"))
}

/// GET /api/v1/users/c/{handle}
pub async fn channel(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(handle): Path<String>,
) -> Result<ApiResponse<ChannelProfile>, ApiError> {
    let profile = state.platform.feed().channel_profile(&handle, viewer).await?;
    Ok(ApiResponse::ok(profile, "User channel fetched successfully"))
}

/// GET /api/v1/users/history
pub async fn history(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<VideoCard>>, ApiError> {
    let request = params.page_request(state.platform.feed_limits)?;
    let page = state
        .platform
        .feed()
        .watch_history(auth.account_id, request)
        .await?;
    Ok(ApiResponse::ok(page, "Watch history fetched successfully"))
}
