use chrono::Utc;
use entity::{video, watch_history};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::modules::error::ServiceError;

/// Side effects of watching a video.
pub struct ViewRecorder<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ViewRecorder<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Count one view of `video_id` and, for a signed-in viewer, move the
    /// video to the front of their watch history.
    ///
    /// Every call counts; there is no per-viewer dedup window. The history
    /// holds one row per (viewer, video) whose `watched_at` is refreshed, so
    /// a repeat watch reorders rather than duplicates.
    #[instrument(skip(self))]
    pub async fn record_view(
        &self,
        video_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let bumped = video::Entity::update_many()
            .col_expr(video::Column::Views, Expr::col(video::Column::Views).add(1))
            .filter(video::Column::Id.eq(video_id))
            .exec(self.db)
            .await?;

        if bumped.rows_affected == 0 {
            return Err(ServiceError::not_found(format!("Video {video_id}")));
        }

        if let Some(viewer) = viewer {
            let entry = watch_history::ActiveModel {
                id: Set(Uuid::now_v7()),
                account_id: Set(viewer),
                video_id: Set(video_id),
                watched_at: Set(Utc::now().into()),
            };

            watch_history::Entity::insert(entry)
                .on_conflict(
                    OnConflict::columns([
                        watch_history::Column::AccountId,
                        watch_history::Column::VideoId,
                    ])
                    .update_column(watch_history::Column::WatchedAt)
                    .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }

        debug!("View recorded");
        Ok(())
    }
}
