use chrono::Utc;
use entity::post;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

use super::cleanup::purge_likes;
use super::now;
use crate::modules::error::{ServiceError, owner_miss, require_text};
use crate::modules::relations::TargetKind;

/// Short text posts ("tweets").
pub struct PostService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PostService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner: Uuid, content: &str) -> Result<post::Model, ServiceError> {
        let content = require_text("content", content)?;

        let now = Utc::now();
        let created = post::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner),
            content: Set(content),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(self.db)
        .await?;

        info!(post_id = %created.id, owner = %owner, "Post created");
        Ok(created)
    }

    pub async fn update(
        &self,
        post_id: Uuid,
        actor: Uuid,
        content: &str,
    ) -> Result<post::Model, ServiceError> {
        let content = require_text("content", content)?;

        let result = post::Entity::update_many()
            .col_expr(post::Column::Content, Expr::value(content))
            .col_expr(post::Column::UpdatedAt, Expr::value(now()))
            .filter(post::Column::Id.eq(post_id))
            .filter(post::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(owner_miss::<post::Entity>(self.db, post_id, "post").await);
        }

        post::Entity::find_by_id(post_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("post {post_id}")))
    }

    pub async fn delete(&self, post_id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
        let result = post::Entity::delete_many()
            .filter(post::Column::Id.eq(post_id))
            .filter(post::Column::OwnerId.eq(actor))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(owner_miss::<post::Entity>(self.db, post_id, "post").await);
        }

        if let Err(e) = purge_likes(self.db, TargetKind::Post, post_id).await {
            warn!(post_id = %post_id, error = %e, "Failed to purge post likes");
        }

        info!(post_id = %post_id, "Post deleted");
        Ok(())
    }
}
