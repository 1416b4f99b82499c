//! Wire types shared by the REST handlers: the response envelopes, the error
//! mapping and the request bodies.

use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use entity::{comment, post, video};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::modules::ServiceError;
use crate::modules::feed::{FeedLimits, PageRequest};

// ============================================================================
// Envelopes
// ============================================================================

/// Success envelope: `{success, statusCode, data, message}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            status_code: status.as_u16(),
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Error envelope: `{success: false, statusCode, errorKind, message}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub status_code: u16,
    pub error_kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            status_code: status.as_u16(),
            error_kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_FAILURE", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => {
                error!(error = %e, "Store operation failed");
                ApiError::internal("Store unavailable")
            }
            ServiceError::InvalidArgument(msg) => ApiError::validation(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(&msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Upstream(msg) => {
                error!(error = %msg, "Upstream call failed");
                ApiError::upstream(msg)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// JSON request body whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

// ============================================================================
// Query parameters
// ============================================================================

/// Pagination and search parameters. Values stay raw strings so malformed
/// input is reported in the error envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_type: Option<String>,
    pub query: Option<String>,
    pub user_id: Option<String>,
}

impl FeedQuery {
    pub fn page_request(&self, limits: FeedLimits) -> Result<PageRequest, ServiceError> {
        PageRequest::parse(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.sort_type.as_deref(),
            limits,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

// ============================================================================
// Write results
// ============================================================================

/// A video as returned by the owner-side write routes. Media public ids stay
/// internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<video::Model> for VideoRecord {
    fn from(video: video::Model) -> Self {
        Self {
            id: video.id,
            owner: video.owner_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: Uuid,
    pub video: Uuid,
    pub owner: Uuid,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<comment::Model> for CommentRecord {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            video: comment.video_id,
            owner: comment.owner_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<post::Model> for PostRecord {
    fn from(post: post::Model) -> Self {
        Self {
            id: post.id,
            owner: post.owner_id,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Outcome of a video deletion. `complete` is false when some dependent
/// records could not be purged.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResponse {
    pub deleted: Uuid,
    pub complete: bool,
}

// ============================================================================
// Toggle responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub is_liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionToggleResponse {
    pub is_subscribed: bool,
}

// ============================================================================
// Multipart
// ============================================================================

/// A fully read multipart form: text fields and file fields by name.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read {name}: {e}")))?;
                form.files.insert(name, bytes);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read {name}: {e}")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Bytes> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> Result<Bytes, ApiError> {
        self.take_file(name)
            .ok_or_else(|| ApiError::validation(format!("{name} file is required")))
    }
}
