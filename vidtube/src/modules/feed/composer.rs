//! Feed assembly.
//!
//! Every feed follows the same steps: filter the collection by scope, count
//! the matches, read one sorted page (ties broken by id so pages never
//! overlap), then join owners and relation facts for that page only.

use std::collections::{HashMap, HashSet};

use entity::{account, comment, like, post, subscription, video, watch_history};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, RelationDef, Select,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::cards::{
    ChannelCard, ChannelProfile, ChannelStats, CommentCard, OwnerCard, PostCard, VideoCard,
    VideoDetail,
};
use super::page::{Page, PageRequest};
use super::views::ViewRecorder;
use crate::modules::error::ServiceError;
use crate::modules::relations::{RelationIndex, RelationKind, TargetKind};

/// Number of comments embedded in a video detail response.
const RECENT_COMMENTS: u64 = 5;

pub struct FeedComposer<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> FeedComposer<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    fn index(&self) -> RelationIndex<'a> {
        RelationIndex::new(self.db)
    }

    // ------------------------------------------------------------------
    // Videos
    // ------------------------------------------------------------------

    /// Videos owned by `channel`, newest first by default.
    pub async fn channel_videos(
        &self,
        channel: Uuid,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<VideoCard>, ServiceError> {
        self.require_account(channel).await?;

        let query = video::Entity::find()
            .filter(video::Column::OwnerId.eq(channel))
            .filter(visible_to(viewer));

        let (videos, total) = self
            .paged(query, video::Column::CreatedAt, video::Column::Id, request)
            .await?;

        Ok(Page::new(self.video_cards(videos, viewer).await?, request, total))
    }

    /// Free-text search over title and description, optionally scoped to one
    /// owner. A missing or blank query lists every visible video.
    pub async fn search_videos(
        &self,
        text: Option<&str>,
        owner: Option<Uuid>,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<VideoCard>, ServiceError> {
        let mut query = video::Entity::find().filter(visible_to(viewer));
        if let Some(owner) = owner {
            query = query.filter(video::Column::OwnerId.eq(owner));
        }
        if let Some(matches) =
            text.and_then(|t| text_match(&[video::Column::Title, video::Column::Description], t))
        {
            query = query.filter(matches);
        }

        let (videos, total) = self
            .paged(query, video::Column::CreatedAt, video::Column::Id, request)
            .await?;

        debug!(query = ?text, total, "Video search");
        Ok(Page::new(self.video_cards(videos, viewer).await?, request, total))
    }

    /// A single video with its channel and the most recent comments.
    ///
    /// Counts a view (and updates the viewer's history) before composing.
    /// A failed recording is logged and the read carries on.
    pub async fn video_detail(
        &self,
        video_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<VideoDetail, ServiceError> {
        let mut video = self.visible_video(video_id, viewer).await?;

        match ViewRecorder::new(self.db).record_view(video_id, viewer).await {
            Ok(()) => video.views += 1,
            Err(e) => warn!(video_id = %video_id, viewer = ?viewer, error = %e, "Failed to record view"),
        }

        let owner = self.require_account(video.owner_id).await?;
        let subscribers = self
            .index()
            .compute(viewer, &[owner.id], RelationKind::Subscription)
            .await?;
        let channel = ChannelCard::build(&owner, subscribers.get(&owner.id), None);

        let mut cards = self.video_cards(vec![video], viewer).await?;
        let card = cards
            .pop()
            .ok_or_else(|| ServiceError::not_found(format!("Video {video_id}")))?;

        let recent = comment::Entity::find()
            .filter(comment::Column::VideoId.eq(video_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .limit(RECENT_COMMENTS)
            .all(self.db)
            .await?;

        Ok(VideoDetail {
            video: card,
            channel,
            recent_comments: self.comment_cards(recent, viewer).await?,
        })
    }

    /// Videos the viewer has watched, most recently watched first.
    pub async fn watch_history(
        &self,
        viewer: Uuid,
        request: PageRequest,
    ) -> Result<Page<VideoCard>, ServiceError> {
        let watched_video: RelationDef = watch_history::Entity::belongs_to(video::Entity)
            .from(watch_history::Column::VideoId)
            .to(video::Column::Id)
            .into();

        let query = watch_history::Entity::find()
            .join(JoinType::InnerJoin, watched_video)
            .filter(watch_history::Column::AccountId.eq(viewer))
            .filter(visible_to(Some(viewer)));

        let (entries, total) = self
            .paged(
                query,
                watch_history::Column::WatchedAt,
                watch_history::Column::Id,
                request,
            )
            .await?;

        let ids: Vec<Uuid> = entries.iter().map(|e| e.video_id).collect();
        let videos = self.videos_in_order(&ids).await?;
        Ok(Page::new(self.video_cards(videos, Some(viewer)).await?, request, total))
    }

    /// Videos the viewer has liked, most recently liked first.
    pub async fn liked_videos(
        &self,
        viewer: Uuid,
        request: PageRequest,
    ) -> Result<Page<VideoCard>, ServiceError> {
        let liked_video: RelationDef = like::Entity::belongs_to(video::Entity)
            .from(like::Column::TargetId)
            .to(video::Column::Id)
            .into();

        let query = like::Entity::find()
            .join(JoinType::InnerJoin, liked_video)
            .filter(like::Column::AccountId.eq(viewer))
            .filter(like::Column::TargetKind.eq(TargetKind::Video))
            .filter(visible_to(Some(viewer)));

        let (likes, total) = self
            .paged(query, like::Column::CreatedAt, like::Column::Id, request)
            .await?;

        let ids: Vec<Uuid> = likes.iter().map(|l| l.target_id).collect();
        let videos = self.videos_in_order(&ids).await?;
        Ok(Page::new(self.video_cards(videos, Some(viewer)).await?, request, total))
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn video_comments(
        &self,
        video_id: Uuid,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<CommentCard>, ServiceError> {
        self.visible_video(video_id, viewer).await?;

        let query = comment::Entity::find().filter(comment::Column::VideoId.eq(video_id));
        let (comments, total) = self
            .paged(query, comment::Column::CreatedAt, comment::Column::Id, request)
            .await?;

        Ok(Page::new(self.comment_cards(comments, viewer).await?, request, total))
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Accounts subscribed to `channel`.
    pub async fn channel_subscribers(
        &self,
        channel: Uuid,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<ChannelCard>, ServiceError> {
        self.require_account(channel).await?;

        let query =
            subscription::Entity::find().filter(subscription::Column::ChannelId.eq(channel));
        let (rows, total) = self
            .paged(
                query,
                subscription::Column::CreatedAt,
                subscription::Column::Id,
                request,
            )
            .await?;

        let listed = rows
            .into_iter()
            .map(|s| (s.subscriber_id, s.created_at))
            .collect();
        Ok(Page::new(self.channel_cards(listed, viewer).await?, request, total))
    }

    /// Channels `subscriber` follows.
    pub async fn subscribed_channels(
        &self,
        subscriber: Uuid,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<ChannelCard>, ServiceError> {
        self.require_account(subscriber).await?;

        let query =
            subscription::Entity::find().filter(subscription::Column::SubscriberId.eq(subscriber));
        let (rows, total) = self
            .paged(
                query,
                subscription::Column::CreatedAt,
                subscription::Column::Id,
                request,
            )
            .await?;

        let listed = rows
            .into_iter()
            .map(|s| (s.channel_id, s.created_at))
            .collect();
        Ok(Page::new(self.channel_cards(listed, viewer).await?, request, total))
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn search_posts(
        &self,
        text: Option<&str>,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<PostCard>, ServiceError> {
        let mut query = post::Entity::find();
        if let Some(matches) = text.and_then(|t| text_match(&[post::Column::Content], t)) {
            query = query.filter(matches);
        }

        let (posts, total) = self
            .paged(query, post::Column::CreatedAt, post::Column::Id, request)
            .await?;

        Ok(Page::new(self.post_cards(posts, viewer).await?, request, total))
    }

    pub async fn channel_posts(
        &self,
        owner: Uuid,
        viewer: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<PostCard>, ServiceError> {
        self.require_account(owner).await?;

        let query = post::Entity::find().filter(post::Column::OwnerId.eq(owner));
        let (posts, total) = self
            .paged(query, post::Column::CreatedAt, post::Column::Id, request)
            .await?;

        Ok(Page::new(self.post_cards(posts, viewer).await?, request, total))
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    pub async fn channel_profile(
        &self,
        handle: &str,
        viewer: Option<Uuid>,
    ) -> Result<ChannelProfile, ServiceError> {
        let handle = handle.trim().to_lowercase();
        if handle.is_empty() {
            return Err(ServiceError::invalid("handle is required"));
        }

        let account = account::Entity::find()
            .filter(account::Column::Handle.eq(handle.as_str()))
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Channel '{handle}'")))?;

        let index = self.index();
        let subscribers = index
            .compute(viewer, &[account.id], RelationKind::Subscription)
            .await?
            .get(&account.id);
        let subscribed_to = index
            .subscribed_to_counts(&[account.id])
            .await?
            .get(&account.id)
            .copied()
            .unwrap_or(0);

        let is_self = viewer == Some(account.id);
        Ok(ChannelProfile {
            id: account.id,
            handle: account.handle,
            display_name: account.display_name,
            avatar_url: account.avatar_url,
            cover_url: account.cover_url,
            subscribers_count: subscribers.count,
            subscribed_to_count: subscribed_to,
            is_subscribed: subscribers.is_active,
            email: is_self.then_some(account.email),
            created_at: account.created_at,
        })
    }

    /// Dashboard totals for `channel`. Drafts only count when `viewer` owns
    /// the channel.
    pub async fn channel_stats(
        &self,
        channel: Uuid,
        viewer: Uuid,
    ) -> Result<ChannelStats, ServiceError> {
        let account = self.require_account(channel).await?;

        let channel_videos = video::Entity::find()
            .filter(video::Column::OwnerId.eq(channel))
            .filter(visible_to(Some(viewer)));

        let views: Vec<i64> = channel_videos
            .clone()
            .select_only()
            .column(video::Column::Views)
            .into_tuple()
            .all(self.db)
            .await?;

        let total_subscribers = subscription::Entity::find()
            .filter(subscription::Column::ChannelId.eq(channel))
            .count(self.db)
            .await?;

        let channel_videos = channel_videos
            .select_only()
            .column(video::Column::Id)
            .into_query();
        let total_likes = like::Entity::find()
            .filter(like::Column::TargetKind.eq(TargetKind::Video))
            .filter(like::Column::TargetId.in_subquery(channel_videos))
            .count(self.db)
            .await?;

        Ok(ChannelStats {
            channel: OwnerCard::from(&account),
            total_videos: views.len() as u64,
            total_views: views.iter().map(|v| (*v).max(0) as u64).sum(),
            total_subscribers,
            total_likes,
        })
    }

    // ------------------------------------------------------------------
    // Shared steps
    // ------------------------------------------------------------------

    async fn paged<E>(
        &self,
        query: Select<E>,
        sort_key: E::Column,
        tie_break: E::Column,
        request: PageRequest,
    ) -> Result<(Vec<E::Model>, u64), DbErr>
    where
        E: EntityTrait,
        E::Model: Sync + 'static,
    {
        let total = query.clone().count(self.db).await?;
        if total == 0 || request.offset() >= total {
            return Ok((Vec::new(), total));
        }

        let order = request.sort.order();
        let items = query
            .order_by(sort_key, order.clone())
            .order_by(tie_break, order)
            .offset(request.offset())
            .limit(request.limit)
            .all(self.db)
            .await?;

        Ok((items, total))
    }

    async fn require_account(&self, id: Uuid) -> Result<account::Model, ServiceError> {
        account::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Channel {id}")))
    }

    /// Unpublished videos are visible to their owner only; everyone else
    /// gets `NotFound`.
    async fn visible_video(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<video::Model, ServiceError> {
        video::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .filter(|v| v.is_published || viewer == Some(v.owner_id))
            .ok_or_else(|| ServiceError::not_found(format!("Video {id}")))
    }

    async fn videos_in_order(&self, ids: &[Uuid]) -> Result<Vec<video::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_id: HashMap<Uuid, video::Model> = video::Entity::find()
            .filter(video::Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn owners(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, account::Model>, DbErr> {
        let ids: HashSet<Uuid> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(account::Entity::find()
            .filter(account::Column::Id.is_in(ids))
            .all(self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect())
    }

    async fn video_cards(
        &self,
        videos: Vec<video::Model>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<VideoCard>, ServiceError> {
        let ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
        let owners = self.owners(videos.iter().map(|v| v.owner_id)).await?;
        let index = self.index();
        let likes = index
            .compute(viewer, &ids, RelationKind::Like(TargetKind::Video))
            .await?;
        let comments = index.comment_counts(&ids).await?;

        Ok(videos
            .into_iter()
            .filter_map(|v| {
                let Some(owner) = owners.get(&v.owner_id) else {
                    warn!(video_id = %v.id, owner_id = %v.owner_id, "Skipping video without owner");
                    return None;
                };
                let facts = likes.get(&v.id);
                let comments_count = comments.get(&v.id).copied().unwrap_or(0);
                Some(VideoCard::build(v, OwnerCard::from(owner), facts, comments_count))
            })
            .collect())
    }

    async fn comment_cards(
        &self,
        comments: Vec<comment::Model>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentCard>, ServiceError> {
        let ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
        let owners = self.owners(comments.iter().map(|c| c.owner_id)).await?;
        let likes = self
            .index()
            .compute(viewer, &ids, RelationKind::Like(TargetKind::Comment))
            .await?;

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let owner = OwnerCard::from(owners.get(&c.owner_id)?);
                let facts = likes.get(&c.id);
                Some(CommentCard::build(c, owner, facts))
            })
            .collect())
    }

    async fn post_cards(
        &self,
        posts: Vec<post::Model>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostCard>, ServiceError> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let owners = self.owners(posts.iter().map(|p| p.owner_id)).await?;
        let likes = self
            .index()
            .compute(viewer, &ids, RelationKind::Like(TargetKind::Post))
            .await?;

        Ok(posts
            .into_iter()
            .filter_map(|p| {
                let owner = OwnerCard::from(owners.get(&p.owner_id)?);
                let facts = likes.get(&p.id);
                Some(PostCard::build(p, owner, facts))
            })
            .collect())
    }

    /// Cards for listed accounts, keeping the order of `listed`.
    async fn channel_cards(
        &self,
        listed: Vec<(Uuid, sea_orm::prelude::DateTimeWithTimeZone)>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<ChannelCard>, ServiceError> {
        let ids: Vec<Uuid> = listed.iter().map(|(id, _)| *id).collect();
        let accounts = self.owners(ids.iter().copied()).await?;
        let facts = self
            .index()
            .compute(viewer, &ids, RelationKind::Subscription)
            .await?;

        Ok(listed
            .into_iter()
            .filter_map(|(id, since)| {
                let account = accounts.get(&id)?;
                Some(ChannelCard::build(account, facts.get(&id), Some(since)))
            })
            .collect())
    }
}

/// Published videos, plus the viewer's own drafts.
fn visible_to(viewer: Option<Uuid>) -> Condition {
    let mut visible = Condition::any().add(video::Column::IsPublished.eq(true));
    if let Some(viewer) = viewer {
        visible = visible.add(video::Column::OwnerId.eq(viewer));
    }
    visible
}

/// Case-insensitive substring match of any whitespace-separated term against
/// any of `columns`. `None` when the text holds no terms.
fn text_match<C>(columns: &[C], text: &str) -> Option<Condition>
where
    C: ColumnTrait,
{
    let terms: Vec<String> = text.split_whitespace().map(like_pattern).collect();
    if terms.is_empty() {
        return None;
    }

    let mut matches = Condition::any();
    for term in &terms {
        for column in columns {
            matches = matches.add(
                Expr::expr(Func::lower(Expr::col(*column)))
                    .like(LikeExpr::new(term.as_str()).escape('\\')),
            );
        }
    }
    Some(matches)
}

fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
