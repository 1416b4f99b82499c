use chrono::Utc;
use entity::{account, comment, like, post, subscription, video};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{RelationKind, TargetKind};
use crate::modules::error::ServiceError;

/// Outcome of a toggle: whether the relation exists afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggled {
    pub active: bool,
}

/// Write side of the like and subscription collections.
///
/// A toggle first tries to delete the relation; if nothing was deleted it
/// inserts one, letting the unique index absorb a concurrent duplicate
/// insert. The store therefore never holds more than one record per
/// (subject, kind, object).
pub struct ToggleEngine<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ToggleEngine<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn toggle(
        &self,
        subject: Uuid,
        object: Uuid,
        kind: RelationKind,
    ) -> Result<Toggled, ServiceError> {
        self.ensure_target(subject, object, kind).await?;

        let outcome = match kind {
            RelationKind::Like(target_kind) => self.toggle_like(subject, object, target_kind).await?,
            RelationKind::Subscription => self.toggle_subscription(subject, object).await?,
        };

        info!(
            subject = %subject,
            object = %object,
            ?kind,
            active = outcome.active,
            "Relation toggled"
        );

        Ok(outcome)
    }

    /// Fail with `NotFound` unless `object` resolves to something `subject`
    /// may relate to.
    async fn ensure_target(
        &self,
        subject: Uuid,
        object: Uuid,
        kind: RelationKind,
    ) -> Result<(), ServiceError> {
        let found = match kind {
            RelationKind::Like(TargetKind::Video) => self.video_visible(subject, object).await?,
            // A comment is only as visible as the video it sits under.
            RelationKind::Like(TargetKind::Comment) => {
                let video_id = comment::Entity::find_by_id(object)
                    .select_only()
                    .column(comment::Column::VideoId)
                    .into_tuple::<Uuid>()
                    .one(self.db)
                    .await?;
                match video_id {
                    Some(video_id) => self.video_visible(subject, video_id).await?,
                    None => false,
                }
            }
            RelationKind::Like(TargetKind::Post) => post::Entity::find_by_id(object)
                .select_only()
                .column(post::Column::Id)
                .into_tuple::<Uuid>()
                .one(self.db)
                .await?
                .is_some(),
            RelationKind::Subscription => {
                if subject == object {
                    return Err(ServiceError::invalid("Cannot subscribe to your own channel"));
                }
                account::Entity::find_by_id(object)
                    .select_only()
                    .column(account::Column::Id)
                    .into_tuple::<Uuid>()
                    .one(self.db)
                    .await?
                    .is_some()
            }
        };

        if found {
            Ok(())
        } else {
            Err(ServiceError::not_found(format!("{} {}", target_label(kind), object)))
        }
    }

    /// Whether `video_id` exists and is published or owned by `subject`.
    async fn video_visible(&self, subject: Uuid, video_id: Uuid) -> Result<bool, ServiceError> {
        let visibility = video::Entity::find_by_id(video_id)
            .select_only()
            .column(video::Column::IsPublished)
            .column(video::Column::OwnerId)
            .into_tuple::<(bool, Uuid)>()
            .one(self.db)
            .await?;

        Ok(visibility.is_some_and(|(is_published, owner)| is_published || owner == subject))
    }

    async fn toggle_like(
        &self,
        subject: Uuid,
        target: Uuid,
        kind: TargetKind,
    ) -> Result<Toggled, ServiceError> {
        let removed = like::Entity::delete_many()
            .filter(like::Column::AccountId.eq(subject))
            .filter(like::Column::TargetKind.eq(kind))
            .filter(like::Column::TargetId.eq(target))
            .exec(self.db)
            .await?;

        if removed.rows_affected > 0 {
            return Ok(Toggled { active: false });
        }

        let record = like::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(subject),
            target_kind: Set(kind),
            target_id: Set(target),
            created_at: Set(Utc::now().into()),
        };

        let inserted = like::Entity::insert(record)
            .on_conflict(
                OnConflict::columns([
                    like::Column::AccountId,
                    like::Column::TargetKind,
                    like::Column::TargetId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        if inserted == 0 {
            debug!(subject = %subject, target = %target, "Like already stored by a concurrent toggle");
        }

        Ok(Toggled { active: true })
    }

    async fn toggle_subscription(
        &self,
        subscriber: Uuid,
        channel: Uuid,
    ) -> Result<Toggled, ServiceError> {
        let removed = subscription::Entity::delete_many()
            .filter(subscription::Column::SubscriberId.eq(subscriber))
            .filter(subscription::Column::ChannelId.eq(channel))
            .exec(self.db)
            .await?;

        if removed.rows_affected > 0 {
            return Ok(Toggled { active: false });
        }

        let record = subscription::ActiveModel {
            id: Set(Uuid::now_v7()),
            subscriber_id: Set(subscriber),
            channel_id: Set(channel),
            created_at: Set(Utc::now().into()),
        };

        let inserted = subscription::Entity::insert(record)
            .on_conflict(
                OnConflict::columns([
                    subscription::Column::SubscriberId,
                    subscription::Column::ChannelId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        if inserted == 0 {
            debug!(subscriber = %subscriber, channel = %channel, "Subscription already stored by a concurrent toggle");
        }

        Ok(Toggled { active: true })
    }
}

fn target_label(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Like(TargetKind::Video) => "Video",
        RelationKind::Like(TargetKind::Comment) => "Comment",
        RelationKind::Like(TargetKind::Post) => "Post",
        RelationKind::Subscription => "Channel",
    }
}
