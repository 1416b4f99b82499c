//! Error taxonomy shared by every service in the core.
//!
//! Handlers convert `ServiceError` into the HTTP error envelope; nothing in
//! the core retries on its own.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

use crate::modules::media::MediaError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Empty(kind) => {
                ServiceError::InvalidArgument(format!("{} file is empty", kind.as_str()))
            }
            MediaError::TooLarge { size, max } => ServiceError::InvalidArgument(format!(
                "File too large: {size} bytes (max: {max})"
            )),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Parse a textual id, failing with `InvalidArgument` on malformed input.
pub fn parse_id(what: &str, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidArgument(format!("Invalid {what} id: {raw}")))
}

/// Trim `value`, rejecting it when nothing is left.
pub fn require_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidArgument(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Explain why an owner-conditional write touched no rows.
///
/// Runs after the write, so a record that exists here but was skipped by the
/// write belongs to someone else.
pub(crate) async fn owner_miss<E>(db: &DatabaseConnection, id: Uuid, what: &str) -> ServiceError
where
    E: EntityTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    match E::find_by_id(id).one(db).await {
        Ok(Some(_)) => ServiceError::Forbidden(format!("Only the owner can modify this {what}")),
        Ok(None) => ServiceError::NotFound(format!("{what} {id}")),
        Err(e) => e.into(),
    }
}
