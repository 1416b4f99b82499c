//! Ordered, idempotent removal of records that hang off a deleted parent.
//!
//! Each step runs even if an earlier one failed. Failures are logged and
//! reported, never retried; rerunning the routine finishes what is left.

use entity::{comment, like, watch_history};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use tracing::{error, info};
use uuid::Uuid;

use crate::modules::relations::TargetKind;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: u64,
    pub failed_steps: Vec<&'static str>,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failed_steps.is_empty()
    }

    fn record(&mut self, step: &'static str, result: Result<u64, sea_orm::DbErr>) {
        match result {
            Ok(n) => self.removed += n,
            Err(e) => {
                error!(step, error = %e, "Cleanup step failed");
                self.failed_steps.push(step);
            }
        }
    }
}

/// Remove comments (and their likes), likes and history entries of a video.
pub async fn purge_video_dependents(db: &DatabaseConnection, video_id: Uuid) -> CleanupReport {
    let mut report = CleanupReport::default();

    let comment_ids = comment::Entity::find()
        .select_only()
        .column(comment::Column::Id)
        .filter(comment::Column::VideoId.eq(video_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await;

    match comment_ids {
        Ok(ids) if !ids.is_empty() => {
            let removed = like::Entity::delete_many()
                .filter(like::Column::TargetKind.eq(TargetKind::Comment))
                .filter(like::Column::TargetId.is_in(ids))
                .exec(db)
                .await
                .map(|r| r.rows_affected);
            report.record("comment_likes", removed);
        }
        Ok(_) => {}
        Err(e) => report.record("comment_likes", Err(e)),
    }

    let removed = comment::Entity::delete_many()
        .filter(comment::Column::VideoId.eq(video_id))
        .exec(db)
        .await
        .map(|r| r.rows_affected);
    report.record("comments", removed);

    report.record("video_likes", purge_likes(db, TargetKind::Video, video_id).await);

    let removed = watch_history::Entity::delete_many()
        .filter(watch_history::Column::VideoId.eq(video_id))
        .exec(db)
        .await
        .map(|r| r.rows_affected);
    report.record("watch_history", removed);

    info!(
        video_id = %video_id,
        removed = report.removed,
        complete = report.is_complete(),
        "Video dependents purged"
    );
    report
}

/// Remove every like pointing at one target.
pub async fn purge_likes(
    db: &DatabaseConnection,
    kind: TargetKind,
    target: Uuid,
) -> Result<u64, sea_orm::DbErr> {
    like::Entity::delete_many()
        .filter(like::Column::TargetKind.eq(kind))
        .filter(like::Column::TargetId.eq(target))
        .exec(db)
        .await
        .map(|r| r.rows_affected)
}
