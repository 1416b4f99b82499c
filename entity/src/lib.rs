pub mod prelude;

pub mod account;
pub mod comment;
pub mod like;
pub mod post;
pub mod subscription;
pub mod video;
pub mod watch_history;
