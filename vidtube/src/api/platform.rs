use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::modules::content::{CommentService, PostService, VideoService};
use crate::modules::feed::{FeedComposer, FeedLimits};
use crate::modules::identity::{AccountService, TokenSettings};
use crate::modules::media::MediaStore;
use crate::modules::relations::ToggleEngine;

/// Everything a request handler needs, shared by all requests.
///
/// Holds no mutable state of its own: the database is the only shared
/// mutable resource, so services are built per call and borrow from here.
#[derive(Clone)]
pub struct Platform {
    pub db: DatabaseConnection,
    pub media: Arc<dyn MediaStore>,
    pub tokens: TokenSettings,
    pub feed_limits: FeedLimits,
}

impl Platform {
    pub fn new(
        db: DatabaseConnection,
        media: Arc<dyn MediaStore>,
        tokens: TokenSettings,
        feed_limits: FeedLimits,
    ) -> Self {
        Platform {
            db,
            media,
            tokens,
            feed_limits,
        }
    }

    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(&self.db, self.media.as_ref(), self.tokens)
    }

    pub fn feed(&self) -> FeedComposer<'_> {
        FeedComposer::new(&self.db)
    }

    pub fn toggles(&self) -> ToggleEngine<'_> {
        ToggleEngine::new(&self.db)
    }

    pub fn videos(&self) -> VideoService<'_> {
        VideoService::new(&self.db, self.media.as_ref())
    }

    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(&self.db)
    }

    pub fn posts(&self) -> PostService<'_> {
        PostService::new(&self.db)
    }
}
