use bytes::Bytes;
use chrono::Utc;
use entity::video;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

use super::cleanup::{CleanupReport, purge_video_dependents};
use super::now;
use crate::modules::error::{ServiceError, owner_miss, require_text};
use crate::modules::media::{MediaKind, MediaStore};

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video: Bytes,
    pub thumbnail: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<Bytes>,
}

/// Owner-side writes on videos.
pub struct VideoService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaStore,
}

impl<'a> VideoService<'a> {
    pub fn new(db: &'a DatabaseConnection, media: &'a dyn MediaStore) -> Self {
        Self { db, media }
    }

    /// Upload both media files and create the video as a draft.
    pub async fn publish(&self, owner: Uuid, new: NewVideo) -> Result<video::Model, ServiceError> {
        let title = require_text("title", &new.title)?;
        let description = require_text("description", &new.description)?;

        let media = self.media.upload(new.video, MediaKind::Video).await?;
        let thumbnail = match self.media.upload(new.thumbnail, MediaKind::Image).await {
            Ok(t) => t,
            Err(e) => {
                self.media.delete(&media.public_id, MediaKind::Video).await;
                return Err(e.into());
            }
        };

        let now = Utc::now();
        let record = video::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner),
            video_url: Set(media.locator.clone()),
            video_public_id: Set(media.public_id.clone()),
            thumbnail_url: Set(thumbnail.locator.clone()),
            thumbnail_public_id: Set(thumbnail.public_id.clone()),
            title: Set(title),
            description: Set(description),
            duration: Set(media.duration.filter(|d| *d >= 0.0).unwrap_or(0.0)),
            views: Set(0),
            is_published: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match record.insert(self.db).await {
            Ok(created) => {
                info!(video_id = %created.id, owner = %owner, "Video published as draft");
                Ok(created)
            }
            Err(e) => {
                self.media.delete(&media.public_id, MediaKind::Video).await;
                self.media.delete(&thumbnail.public_id, MediaKind::Image).await;
                Err(e.into())
            }
        }
    }

    /// Change title, description and/or thumbnail.
    pub async fn update(
        &self,
        video_id: Uuid,
        actor: Uuid,
        changes: VideoChanges,
    ) -> Result<video::Model, ServiceError> {
        let title = changes
            .title
            .as_deref()
            .map(|t| require_text("title", t))
            .transpose()?;
        let description = changes
            .description
            .as_deref()
            .map(|d| require_text("description", d))
            .transpose()?;
        if title.is_none() && description.is_none() && changes.thumbnail.is_none() {
            return Err(ServiceError::invalid(
                "title, description or thumbnail is required",
            ));
        }

        // Ownership is checked before anything is uploaded.
        let current = self.owned(video_id, actor).await?;

        let thumbnail = match changes.thumbnail {
            Some(bytes) => Some(self.media.upload(bytes, MediaKind::Image).await?),
            None => None,
        };

        let mut update = video::Entity::update_many()
            .col_expr(video::Column::UpdatedAt, Expr::value(now()))
            .filter(video::Column::Id.eq(video_id))
            .filter(video::Column::OwnerId.eq(actor));
        if let Some(title) = title {
            update = update.col_expr(video::Column::Title, Expr::value(title));
        }
        if let Some(description) = description {
            update = update.col_expr(video::Column::Description, Expr::value(description));
        }
        if let Some(thumb) = &thumbnail {
            update = update
                .col_expr(video::Column::ThumbnailUrl, Expr::value(thumb.locator.clone()))
                .col_expr(
                    video::Column::ThumbnailPublicId,
                    Expr::value(thumb.public_id.clone()),
                );
        }

        let updated = match update.exec(self.db).await {
            Ok(result) => result.rows_affected,
            Err(e) => {
                if let Some(thumb) = &thumbnail {
                    self.media.delete(&thumb.public_id, MediaKind::Image).await;
                }
                return Err(e.into());
            }
        };

        if updated == 0 {
            if let Some(thumb) = &thumbnail {
                self.media.delete(&thumb.public_id, MediaKind::Image).await;
            }
            return Err(owner_miss::<video::Entity>(self.db, video_id, "video").await);
        }

        if thumbnail.is_some() {
            self.media
                .delete(&current.thumbnail_public_id, MediaKind::Image)
                .await;
        }

        info!(video_id = %video_id, "Video updated");
        self.find(video_id).await
    }

    /// Flip the published flag. Only the owner may do this.
    pub async fn toggle_publish(
        &self,
        video_id: Uuid,
        actor: Uuid,
    ) -> Result<video::Model, ServiceError> {
        let result = video::Entity::update_many()
            .col_expr(
                video::Column::IsPublished,
                Expr::col(video::Column::IsPublished).not(),
            )
            .filter(video::Column::Id.eq(video_id))
            .filter(video::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(owner_miss::<video::Entity>(self.db, video_id, "video").await);
        }

        let video = self.find(video_id).await?;
        info!(video_id = %video_id, published = video.is_published, "Publish status toggled");
        Ok(video)
    }

    /// Release the media, delete the record, then purge what hung off it.
    ///
    /// Only the record deletion can fail the call; media and dependent
    /// cleanup failures are logged and returned in the report.
    pub async fn delete(&self, video_id: Uuid, actor: Uuid) -> Result<CleanupReport, ServiceError> {
        let video = self.owned(video_id, actor).await?;

        if !self.media.delete(&video.video_public_id, MediaKind::Video).await {
            warn!(video_id = %video_id, "Video media not released");
        }
        if !self
            .media
            .delete(&video.thumbnail_public_id, MediaKind::Image)
            .await
        {
            warn!(video_id = %video_id, "Thumbnail media not released");
        }

        let result = video::Entity::delete_many()
            .filter(video::Column::Id.eq(video_id))
            .filter(video::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(owner_miss::<video::Entity>(self.db, video_id, "video").await);
        }

        info!(video_id = %video_id, "Video deleted");
        Ok(purge_video_dependents(self.db, video_id).await)
    }

    async fn find(&self, video_id: Uuid) -> Result<video::Model, ServiceError> {
        video::Entity::find_by_id(video_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Video {video_id}")))
    }

    async fn owned(&self, video_id: Uuid, actor: Uuid) -> Result<video::Model, ServiceError> {
        let video = self.find(video_id).await?;
        if video.owner_id != actor {
            return Err(ServiceError::Forbidden(
                "Only the owner can modify this video".to_string(),
            ));
        }
        Ok(video)
    }
}
