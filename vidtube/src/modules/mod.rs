pub mod content;
pub mod error;
pub mod feed;
pub mod identity;
pub mod media;
pub mod relations;

pub use error::ServiceError;
