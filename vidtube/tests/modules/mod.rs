pub mod content;
pub mod identity;
pub mod relations;
