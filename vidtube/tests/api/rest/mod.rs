pub mod comments;
pub mod helpers;
pub mod users;
