use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::store::{MediaError, MediaKind, MediaStore, UploadedMedia};
use crate::bootstrap::config::MediaConfig;

/// Filesystem-backed media store.
///
/// Objects live under `<root>/<kind>/<public_id>` and are served by the REST
/// server below the configured public base URL. The public id is the SHA-256
/// of the payload followed by a per-upload suffix, so two records uploading
/// identical bytes never share (and never delete) each other's object.
pub struct LocalMediaStore {
    root: PathBuf,
    public_base_url: String,
    max_upload_bytes: u64,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, max_upload_bytes: u64) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(
            config.root.clone(),
            &config.public_base_url,
            config.max_upload_bytes,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, kind: MediaKind, public_id: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(public_id)
    }

    fn locator(&self, kind: MediaKind, public_id: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, kind.as_str(), public_id)
    }
}

fn is_valid_public_id(public_id: &str) -> bool {
    !public_id.is_empty() && public_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    #[instrument(skip(self, bytes), fields(kind = kind.as_str(), size = bytes.len()))]
    async fn upload(&self, bytes: Bytes, kind: MediaKind) -> Result<UploadedMedia, MediaError> {
        let size = bytes.len() as u64;
        if size == 0 {
            return Err(MediaError::Empty(kind));
        }
        if size > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let digest = Sha256::digest(&bytes);
        let public_id = format!("{:x}-{}", digest, Uuid::new_v4().simple());

        let dir = self.root.join(kind.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&public_id), &bytes).await?;

        info!(public_id = %public_id, "Stored media object");

        Ok(UploadedMedia {
            locator: self.locator(kind, &public_id),
            public_id,
            duration: None,
            size,
        })
    }

    #[instrument(skip(self), fields(kind = kind.as_str()))]
    async fn delete(&self, public_id: &str, kind: MediaKind) -> bool {
        if !is_valid_public_id(public_id) {
            warn!(public_id = %public_id, "Refusing to delete malformed media id");
            return false;
        }

        match tokio::fs::remove_file(self.object_path(kind, public_id)).await {
            Ok(()) => {
                debug!(public_id = %public_id, "Deleted media object");
                true
            }
            Err(e) => {
                warn!(public_id = %public_id, error = %e, "Failed to delete media object");
                false
            }
        }
    }
}
