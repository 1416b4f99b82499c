//! Read side: paginated, denormalized feeds and the view recorder.

mod cards;
mod composer;
mod page;
mod views;

pub use cards::{
    ChannelCard, ChannelProfile, ChannelStats, CommentCard, OwnerCard, PostCard, VideoCard,
    VideoDetail,
};
pub use composer::FeedComposer;
pub use page::{FeedLimits, Page, PageRequest, SortDirection};
pub use views::ViewRecorder;
