use std::collections::{HashMap, HashSet};

use entity::{comment, like, subscription};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{RelationKind, TargetKind};

/// Viewer-relative facts about one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationFacts {
    /// A relation from the viewer to the target exists
    pub is_active: bool,
    /// Relations pointing at the target, from anyone
    pub count: u64,
}

/// Facts for a batch of targets. Unknown targets read as `{false, 0}`.
#[derive(Debug, Default, Clone)]
pub struct FactSet {
    counts: HashMap<Uuid, u64>,
    active: HashSet<Uuid>,
}

impl FactSet {
    pub fn get(&self, target: &Uuid) -> RelationFacts {
        RelationFacts {
            is_active: self.active.contains(target),
            count: self.counts.get(target).copied().unwrap_or(0),
        }
    }
}

/// Read side of the like and subscription collections.
///
/// Every method issues one grouped query for the whole batch of targets (plus
/// one membership query when a viewer is present) and skips the store
/// entirely for an empty batch.
pub struct RelationIndex<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RelationIndex<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Compute `{isActive, count}` for each of `targets` under `kind`.
    pub async fn compute(
        &self,
        viewer: Option<Uuid>,
        targets: &[Uuid],
        kind: RelationKind,
    ) -> Result<FactSet, DbErr> {
        if targets.is_empty() {
            return Ok(FactSet::default());
        }

        let facts = match kind {
            RelationKind::Like(target_kind) => self.like_facts(viewer, targets, target_kind).await?,
            RelationKind::Subscription => self.subscription_facts(viewer, targets).await?,
        };

        debug!(
            targets = targets.len(),
            with_viewer = viewer.is_some(),
            ?kind,
            "Computed relation facts"
        );

        Ok(facts)
    }

    async fn like_facts(
        &self,
        viewer: Option<Uuid>,
        targets: &[Uuid],
        kind: TargetKind,
    ) -> Result<FactSet, DbErr> {
        let rows: Vec<(Uuid, i64)> = like::Entity::find()
            .select_only()
            .column(like::Column::TargetId)
            .column_as(Expr::col((like::Entity, like::Column::Id)).count(), "count")
            .filter(like::Column::TargetKind.eq(kind))
            .filter(like::Column::TargetId.is_in(targets.iter().copied()))
            .group_by(like::Column::TargetId)
            .into_tuple()
            .all(self.db)
            .await?;

        let active = match viewer {
            Some(viewer) => like::Entity::find()
                .select_only()
                .column(like::Column::TargetId)
                .filter(like::Column::AccountId.eq(viewer))
                .filter(like::Column::TargetKind.eq(kind))
                .filter(like::Column::TargetId.is_in(targets.iter().copied()))
                .into_tuple::<Uuid>()
                .all(self.db)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(FactSet {
            counts: into_counts(rows),
            active,
        })
    }

    async fn subscription_facts(
        &self,
        viewer: Option<Uuid>,
        channels: &[Uuid],
    ) -> Result<FactSet, DbErr> {
        let rows: Vec<(Uuid, i64)> = subscription::Entity::find()
            .select_only()
            .column(subscription::Column::ChannelId)
            .column_as(
                Expr::col((subscription::Entity, subscription::Column::Id)).count(),
                "count",
            )
            .filter(subscription::Column::ChannelId.is_in(channels.iter().copied()))
            .group_by(subscription::Column::ChannelId)
            .into_tuple()
            .all(self.db)
            .await?;

        let active = match viewer {
            Some(viewer) => subscription::Entity::find()
                .select_only()
                .column(subscription::Column::ChannelId)
                .filter(subscription::Column::SubscriberId.eq(viewer))
                .filter(subscription::Column::ChannelId.is_in(channels.iter().copied()))
                .into_tuple::<Uuid>()
                .all(self.db)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(FactSet {
            counts: into_counts(rows),
            active,
        })
    }

    /// Number of channels each account subscribes to.
    pub async fn subscribed_to_counts(
        &self,
        accounts: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, DbErr> {
        if accounts.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = subscription::Entity::find()
            .select_only()
            .column(subscription::Column::SubscriberId)
            .column_as(
                Expr::col((subscription::Entity, subscription::Column::Id)).count(),
                "count",
            )
            .filter(subscription::Column::SubscriberId.is_in(accounts.iter().copied()))
            .group_by(subscription::Column::SubscriberId)
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(into_counts(rows))
    }

    /// Number of comments on each video.
    pub async fn comment_counts(&self, videos: &[Uuid]) -> Result<HashMap<Uuid, u64>, DbErr> {
        if videos.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = comment::Entity::find()
            .select_only()
            .column(comment::Column::VideoId)
            .column_as(Expr::col((comment::Entity, comment::Column::Id)).count(), "count")
            .filter(comment::Column::VideoId.is_in(videos.iter().copied()))
            .group_by(comment::Column::VideoId)
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(into_counts(rows))
    }
}

fn into_counts(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect()
}
