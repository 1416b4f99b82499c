pub use super::account::Entity as Account;
pub use super::comment::Entity as Comment;
pub use super::like::Entity as Like;
pub use super::post::Entity as Post;
pub use super::subscription::Entity as Subscription;
pub use super::video::Entity as Video;
pub use super::watch_history::Entity as WatchHistory;
