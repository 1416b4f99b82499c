//! Media store boundary: upload bytes, get back a stable locator.

mod local;
mod store;

pub use local::LocalMediaStore;
pub use store::{MediaError, MediaKind, MediaStore, UploadedMedia};
