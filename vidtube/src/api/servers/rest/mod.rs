//! REST API router configuration.
//!
//! This module contains route definitions and server startup logic.
//! All handler implementations are in their respective submodules.

mod comments;
mod dashboard;
mod health;
mod likes;
mod subscriptions;
mod tweets;
mod users;
mod videos;

use crate::api::servers::app_state::AppState;
use crate::bootstrap::config::Config;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use errors::AppError;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Headroom for multipart boundaries and text fields on top of the files.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the REST API router with all routes.
pub fn build_router(app_state: AppState, config: &Config) -> Router {
    let cors = build_cors_layer(config);
    let api = "/api/v1";

    // A video upload carries the video and its thumbnail.
    let body_limit = config
        .media
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        // Health
        .route(&format!("{api}/health"), get(health::check))
        // Users
        .route(&format!("{api}/users/register"), post(users::register))
        .route(&format!("{api}/users/login"), post(users::login))
        .route(&format!("{api}/users/logout"), post(users::logout))
        .route(&format!("{api}/users/refresh-token"), post(users::refresh))
        .route(
            &format!("{api}/users/change-password"),
            post(users::change_password),
        )
        .route(&format!("{api}/users/current-user"), get(users::current))
        .route(
            &format!("{api}/users/update-account"),
            patch(users::update_details),
        )
        .route(&format!("{api}/users/avatar"), patch(users::update_avatar))
        .route(
            &format!("{api}/users/cover-image"),
            patch(users::update_cover),
        )
        .route(&format!("{api}/users/c/{{handle}}"), get(users::channel))
        .route(&format!("{api}/users/history"), get(users::history))
        // Videos
        .route(
            &format!("{api}/videos"),
            get(videos::list).post(videos::publish),
        )
        .route(
            &format!("{api}/videos/{{video_id}}"),
            get(videos::detail)
                .patch(videos::update)
                .delete(videos::delete),
        )
        .route(
            &format!("{api}/videos/toggle/publish/{{video_id}}"),
            patch(videos::toggle_publish),
        )
        // Comments
        .route(
            &format!("{api}/comments/{{video_id}}"),
            get(comments::list).post(comments::add),
        )
        .route(
            &format!("{api}/comments/c/{{comment_id}}"),
            patch(comments::update).delete(comments::delete),
        )
        // Likes
        .route(
            &format!("{api}/likes/toggle/v/{{video_id}}"),
            post(likes::toggle_video),
        )
        .route(
            &format!("{api}/likes/toggle/c/{{comment_id}}"),
            post(likes::toggle_comment),
        )
        .route(
            &format!("{api}/likes/toggle/t/{{tweet_id}}"),
            post(likes::toggle_tweet),
        )
        .route(&format!("{api}/likes/videos"), get(likes::liked_videos))
        // Subscriptions
        .route(
            &format!("{api}/subscriptions/c/{{channel_id}}"),
            get(subscriptions::subscribers).post(subscriptions::toggle),
        )
        .route(
            &format!("{api}/subscriptions/u/{{subscriber_id}}"),
            get(subscriptions::subscribed_channels),
        )
        // Tweets
        .route(
            &format!("{api}/tweets"),
            get(tweets::search).post(tweets::create),
        )
        .route(&format!("{api}/tweets/user/{{user_id}}"), get(tweets::by_user))
        .route(
            &format!("{api}/tweets/{{tweet_id}}"),
            patch(tweets::update).delete(tweets::delete),
        )
        // Dashboard
        .route(&format!("{api}/dashboard/stats"), get(dashboard::stats))
        .route(
            &format!("{api}/dashboard/stats/{{channel_id}}"),
            get(dashboard::channel_stats),
        )
        .route(&format!("{api}/dashboard/videos"), get(dashboard::videos))
        .route(
            &format!("{api}/dashboard/videos/{{channel_id}}"),
            get(dashboard::channel_videos),
        )
        // Stored media
        .nest_service("/media", ServeDir::new(&config.media.root))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, ACCEPT, CONTENT_TYPE, AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(3600));

    if config.cors.allow_credentials {
        cors = cors.allow_credentials(true);
    }

    cors
}

/// Start the REST server and serve until `shutdown` resolves.
pub async fn start(
    app_state: &AppState,
    config: &Config,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let app = build_router(app_state.clone(), config);
    let bind_addr = format!("{}:{}", config.server.host, config.server.rest_port);

    info!("Starting REST server on {}", &bind_addr);
    info!("CORS allowed origins: {:?}", config.cors.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
