//! Owner-side writes: videos, comments and posts.
//!
//! Mutations of an existing record are single conditional statements that
//! match both the record id and its owner.

mod cleanup;
mod comments;
mod posts;
mod videos;

pub use cleanup::{CleanupReport, purge_likes, purge_video_dependents};
pub use comments::CommentService;
pub use posts::PostService;
pub use videos::{NewVideo, VideoChanges, VideoService};

use chrono::{DateTime, FixedOffset, Utc};

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}
