//! Public projections returned by the feed composer.
//!
//! These are the only shapes that leave the core for reads. None of them
//! carries a credential hash, a refresh token, or another account's email.

use chrono::{DateTime, FixedOffset};
use entity::{account, comment, post, video};
use serde::Serialize;
use uuid::Uuid;

use crate::modules::relations::RelationFacts;

/// Owner identity joined onto videos, comments and posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerCard {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl From<&account::Model> for OwnerCard {
    fn from(account: &account::Model) -> Self {
        Self {
            id: account.id,
            handle: account.handle.clone(),
            display_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub owner: OwnerCard,
    pub likes_count: u64,
    pub is_liked: bool,
    pub comments_count: u64,
}

impl VideoCard {
    pub fn build(
        video: video::Model,
        owner: OwnerCard,
        likes: RelationFacts,
        comments_count: u64,
    ) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
            owner,
            likes_count: likes.count,
            is_liked: likes.is_active,
            comments_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCard {
    pub id: Uuid,
    pub video_id: Uuid,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub owner: OwnerCard,
    pub likes_count: u64,
    pub is_liked: bool,
}

impl CommentCard {
    pub fn build(comment: comment::Model, owner: OwnerCard, likes: RelationFacts) -> Self {
        Self {
            id: comment.id,
            video_id: comment.video_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            owner,
            likes_count: likes.count,
            is_liked: likes.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub owner: OwnerCard,
    pub likes_count: u64,
    pub is_liked: bool,
}

impl PostCard {
    pub fn build(post: post::Model, owner: OwnerCard, likes: RelationFacts) -> Self {
        Self {
            id: post.id,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            owner,
            likes_count: likes.count,
            is_liked: likes.is_active,
        }
    }
}

/// A channel as listed in subscriber and following feeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCard {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
    pub subscribers_count: u64,
    pub is_subscribed: bool,
    /// When the listed subscription was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<DateTime<FixedOffset>>,
}

impl ChannelCard {
    pub fn build(
        account: &account::Model,
        subscribers: RelationFacts,
        subscribed_at: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            id: account.id,
            handle: account.handle.clone(),
            display_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
            subscribers_count: subscribers.count,
            is_subscribed: subscribers.is_active,
            subscribed_at,
        }
    }
}

/// Video detail page: the video card, its channel, and a short comment preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: VideoCard,
    pub channel: ChannelCard,
    pub recent_comments: Vec<CommentCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
    pub cover_url: Option<String>,
    pub subscribers_count: u64,
    pub subscribed_to_count: u64,
    pub is_subscribed: bool,
    /// Only present when the viewer is the channel itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// Aggregate numbers for a channel dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub channel: OwnerCard,
    pub total_videos: u64,
    pub total_views: u64,
    pub total_subscribers: u64,
    pub total_likes: u64,
}
