use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    /// Public URL of the stored object
    pub locator: String,
    /// Store-specific identifier used for deletion
    pub public_id: String,
    /// Length in seconds when the store can derive it
    pub duration: Option<f64>,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Empty {} upload", .0.as_str())]
    Empty(MediaKind),

    #[error("Upload too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid media id: {0}")]
    InvalidId(String),

    #[error("Media IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Object store holding uploaded videos and images.
///
/// `delete` is best-effort: it reports success as a bool and never fails the
/// caller.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Bytes, kind: MediaKind) -> Result<UploadedMedia, MediaError>;

    async fn delete(&self, public_id: &str, kind: MediaKind) -> bool;
}
