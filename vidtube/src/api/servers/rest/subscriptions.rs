use axum::extract::{Path, Query, State};

use crate::api::dto::{ApiError, ApiResponse, FeedQuery, SubscriptionToggleResponse};
use crate::api::servers::app_state::AppState;
use crate::api::servers::jwt_middleware::{AuthenticatedAccount, CurrentViewer};
use crate::modules::error::parse_id;
use crate::modules::feed::{ChannelCard, Page};
use crate::modules::relations::RelationKind;

/// POST /api/v1/subscriptions/c/{channel_id}
pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthenticatedAccount,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<SubscriptionToggleResponse>, ApiError> {
    let channel_id = parse_id("channel", &channel_id)?;
    let toggled = state
        .platform
        .toggles()
        .toggle(auth.account_id, channel_id, RelationKind::Subscription)
        .await?;

    let message = if toggled.active {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(ApiResponse::ok(
        SubscriptionToggleResponse {
            is_subscribed: toggled.active,
        },
        message,
    ))
}

/// GET /api/v1/subscriptions/c/{channel_id}
///
/// Accounts subscribed to the channel.
pub async fn subscribers(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(channel_id): Path<String>,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<ChannelCard>>, ApiError> {
    let channel_id = parse_id("channel", &channel_id)?;
    let request = params.page_request(state.platform.feed_limits)?;

    let page = state
        .platform
        .feed()
        .channel_subscribers(channel_id, viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "Subscribers fetched successfully"))
}

/// GET /api/v1/subscriptions/u/{subscriber_id}
///
/// Channels the account is subscribed to.
pub async fn subscribed_channels(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(subscriber_id): Path<String>,
    Query(params): Query<FeedQuery>,
) -> Result<ApiResponse<Page<ChannelCard>>, ApiError> {
    let subscriber_id = parse_id("subscriber", &subscriber_id)?;
    let request = params.page_request(state.platform.feed_limits)?;

    let page = state
        .platform
        .feed()
        .subscribed_channels(subscriber_id, viewer, request)
        .await?;
    Ok(ApiResponse::ok(page, "Subscribed channels fetched successfully"))
}
