use chrono::Utc;
use entity::{comment, video};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

use super::cleanup::purge_likes;
use super::now;
use crate::modules::error::{ServiceError, owner_miss, require_text};
use crate::modules::relations::TargetKind;

pub struct CommentService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CommentService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comment on a video the author can see.
    pub async fn add(
        &self,
        video_id: Uuid,
        author: Uuid,
        content: &str,
    ) -> Result<comment::Model, ServiceError> {
        let content = require_text("content", content)?;

        let visible = video::Entity::find_by_id(video_id)
            .one(self.db)
            .await?
            .is_some_and(|v| v.is_published || v.owner_id == author);
        if !visible {
            return Err(ServiceError::not_found(format!("Video {video_id}")));
        }

        let now = Utc::now();
        let created = comment::ActiveModel {
            id: Set(Uuid::now_v7()),
            video_id: Set(video_id),
            owner_id: Set(author),
            content: Set(content),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db)
        .await?;

        info!(comment_id = %created.id, video_id = %video_id, "Comment added");
        Ok(created)
    }

    pub async fn update(
        &self,
        comment_id: Uuid,
        actor: Uuid,
        content: &str,
    ) -> Result<comment::Model, ServiceError> {
        let content = require_text("content", content)?;

        let result = comment::Entity::update_many()
            .col_expr(comment::Column::Content, Expr::value(content))
            .col_expr(comment::Column::UpdatedAt, Expr::value(now()))
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(owner_miss::<comment::Entity>(self.db, comment_id, "comment").await);
        }

        comment::Entity::find_by_id(comment_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("comment {comment_id}")))
    }

    /// Delete the comment, then the likes on it.
    pub async fn delete(&self, comment_id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
        let result = comment::Entity::delete_many()
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(owner_miss::<comment::Entity>(self.db, comment_id, "comment").await);
        }

        if let Err(e) = purge_likes(self.db, TargetKind::Comment, comment_id).await {
            warn!(comment_id = %comment_id, error = %e, "Failed to purge comment likes");
        }

        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }
}
