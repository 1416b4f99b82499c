//! Account lifecycle: registration, sessions, profile edits.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use entity::account;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set, SqlErr,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::jwt::{self, TokenKind};
use super::password::{hash_password, verify_password};
use crate::modules::error::{ServiceError, require_text};
use crate::modules::media::{MediaKind, MediaStore};

/// Token lifetimes used when opening a session.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub access_expiry_hours: i64,
    pub refresh_expiry_hours: i64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_expiry_hours: 1,
            refresh_expiry_hours: 240,
        }
    }
}

/// The signed-in account's own view of itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub id: Uuid,
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
    pub cover_url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<account::Model> for AccountDetails {
    fn from(a: account::Model) -> Self {
        Self {
            id: a.id,
            handle: a.handle,
            email: a.email,
            display_name: a.display_name,
            avatar_url: a.avatar_url,
            cover_url: a.cover_url,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub account: AccountDetails,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub avatar: Bytes,
    pub cover: Option<Bytes>,
}

pub struct AccountService<'a> {
    db: &'a DatabaseConnection,
    media: &'a dyn MediaStore,
    tokens: TokenSettings,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a DatabaseConnection, media: &'a dyn MediaStore, tokens: TokenSettings) -> Self {
        Self { db, media, tokens }
    }

    pub async fn register(&self, new: NewAccount) -> Result<AccountDetails, ServiceError> {
        let handle = require_text("username", &new.handle)?.to_lowercase();
        let email = normalize_email(&new.email)?;
        let display_name = require_text("fullname", &new.display_name)?;
        if new.password.trim().is_empty() {
            return Err(ServiceError::invalid("password is required"));
        }

        let taken = account::Entity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Handle.eq(handle.as_str()))
                    .add(account::Column::Email.eq(email.as_str())),
            )
            .one(self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let password_hash = hash_blocking(new.password).await?;

        let avatar = self.media.upload(new.avatar, MediaKind::Image).await?;
        let cover = match new.cover {
            Some(bytes) => match self.media.upload(bytes, MediaKind::Image).await {
                Ok(cover) => Some(cover),
                Err(e) => {
                    self.media.delete(&avatar.public_id, MediaKind::Image).await;
                    return Err(e.into());
                }
            },
            None => None,
        };

        let now = Utc::now();
        let record = account::ActiveModel {
            id: Set(Uuid::now_v7()),
            handle: Set(handle),
            email: Set(email),
            display_name: Set(display_name),
            password_hash: Set(password_hash),
            avatar_url: Set(avatar.locator.clone()),
            avatar_public_id: Set(avatar.public_id.clone()),
            cover_url: Set(cover.as_ref().map(|c| c.locator.clone())),
            cover_public_id: Set(cover.as_ref().map(|c| c.public_id.clone())),
            refresh_token: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match record.insert(self.db).await {
            Ok(created) => {
                info!(account_id = %created.id, handle = %created.handle, "Account registered");
                Ok(created.into())
            }
            Err(e) => {
                self.media.delete(&avatar.public_id, MediaKind::Image).await;
                if let Some(cover) = cover {
                    self.media.delete(&cover.public_id, MediaKind::Image).await;
                }
                Err(conflict_or_db(e))
            }
        }
    }

    /// Sign in by handle or email.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, ServiceError> {
        let identifier = require_text("username or email", identifier)?.to_lowercase();

        let account = account::Entity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Handle.eq(identifier.as_str()))
                    .add(account::Column::Email.eq(identifier.as_str())),
            )
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User does not exist"))?;

        if !verify_blocking(password.to_string(), account.password_hash.clone()).await? {
            warn!(account_id = %account.id, "Rejected login with wrong password");
            return Err(ServiceError::Unauthorized("Invalid user credentials".to_string()));
        }

        self.open_session(account, None).await
    }

    /// Exchange a refresh token for a new token pair. The presented token
    /// must be the one currently stored for the account.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ServiceError> {
        let claims = jwt::validate_kind(refresh_token, TokenKind::Refresh)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {e}")))?;
        let account_id = claims
            .account_id()
            .ok_or_else(|| ServiceError::Unauthorized("Invalid refresh token".to_string()))?;

        let account = account::Entity::find_by_id(account_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid refresh token".to_string()))?;

        self.open_session(account, Some(refresh_token)).await
    }

    pub async fn logout(&self, account_id: Uuid) -> Result<(), ServiceError> {
        account::Entity::update_many()
            .col_expr(account::Column::RefreshToken, Expr::value(Option::<String>::None))
            .filter(account::Column::Id.eq(account_id))
            .exec(self.db)
            .await?;

        info!(account_id = %account_id, "Account logged out");
        Ok(())
    }

    pub async fn change_password(
        &self,
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if new_password.trim().is_empty() {
            return Err(ServiceError::invalid("newPassword is required"));
        }

        let account = self.find(account_id).await?;
        if !verify_blocking(old_password.to_string(), account.password_hash).await? {
            return Err(ServiceError::invalid("Invalid old password"));
        }

        let password_hash = hash_blocking(new_password.to_string()).await?;
        account::Entity::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(account::Column::UpdatedAt, Expr::value(now()))
            .filter(account::Column::Id.eq(account_id))
            .exec(self.db)
            .await?;

        info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    pub async fn current(&self, account_id: Uuid) -> Result<AccountDetails, ServiceError> {
        Ok(self.find(account_id).await?.into())
    }

    pub async fn update_details(
        &self,
        account_id: Uuid,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<AccountDetails, ServiceError> {
        let display_name = display_name
            .map(|d| require_text("fullname", d))
            .transpose()?;
        let email = email.map(normalize_email).transpose()?;
        if display_name.is_none() && email.is_none() {
            return Err(ServiceError::invalid("fullname or email is required"));
        }

        let mut update = account::Entity::update_many()
            .col_expr(account::Column::UpdatedAt, Expr::value(now()))
            .filter(account::Column::Id.eq(account_id));
        if let Some(display_name) = display_name {
            update = update.col_expr(account::Column::DisplayName, Expr::value(display_name));
        }
        if let Some(email) = email {
            update = update.col_expr(account::Column::Email, Expr::value(email));
        }

        let result = update.exec(self.db).await.map_err(conflict_or_db)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found(format!("Account {account_id}")));
        }

        self.current(account_id).await
    }

    pub async fn update_avatar(
        &self,
        account_id: Uuid,
        bytes: Bytes,
    ) -> Result<AccountDetails, ServiceError> {
        let previous = self.find(account_id).await?;
        let uploaded = self.media.upload(bytes, MediaKind::Image).await?;

        let result = account::Entity::update_many()
            .col_expr(account::Column::AvatarUrl, Expr::value(uploaded.locator.clone()))
            .col_expr(account::Column::AvatarPublicId, Expr::value(uploaded.public_id.clone()))
            .col_expr(account::Column::UpdatedAt, Expr::value(now()))
            .filter(account::Column::Id.eq(account_id))
            .exec(self.db)
            .await;

        match result {
            Ok(_) => {
                self.media
                    .delete(&previous.avatar_public_id, MediaKind::Image)
                    .await;
                self.current(account_id).await
            }
            Err(e) => {
                self.media.delete(&uploaded.public_id, MediaKind::Image).await;
                Err(e.into())
            }
        }
    }

    pub async fn update_cover(
        &self,
        account_id: Uuid,
        bytes: Bytes,
    ) -> Result<AccountDetails, ServiceError> {
        let previous = self.find(account_id).await?;
        let uploaded = self.media.upload(bytes, MediaKind::Image).await?;

        let result = account::Entity::update_many()
            .col_expr(account::Column::CoverUrl, Expr::value(Some(uploaded.locator.clone())))
            .col_expr(
                account::Column::CoverPublicId,
                Expr::value(Some(uploaded.public_id.clone())),
            )
            .col_expr(account::Column::UpdatedAt, Expr::value(now()))
            .filter(account::Column::Id.eq(account_id))
            .exec(self.db)
            .await;

        match result {
            Ok(_) => {
                if let Some(old) = previous.cover_public_id {
                    self.media.delete(&old, MediaKind::Image).await;
                }
                self.current(account_id).await
            }
            Err(e) => {
                self.media.delete(&uploaded.public_id, MediaKind::Image).await;
                Err(e.into())
            }
        }
    }

    async fn find(&self, account_id: Uuid) -> Result<account::Model, ServiceError> {
        account::Entity::find_by_id(account_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Account {account_id}")))
    }

    /// Mint a token pair and store the refresh token. With `rotating`, the
    /// write only lands while that token is still the stored one.
    async fn open_session(
        &self,
        account: account::Model,
        rotating: Option<&str>,
    ) -> Result<Session, ServiceError> {
        let access_token = jwt::generate_token(
            account.id,
            &account.handle,
            TokenKind::Access,
            self.tokens.access_expiry_hours,
        )
        .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let refresh_token = jwt::generate_token(
            account.id,
            &account.handle,
            TokenKind::Refresh,
            self.tokens.refresh_expiry_hours,
        )
        .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        let mut store = account::Entity::update_many()
            .col_expr(account::Column::RefreshToken, Expr::value(Some(refresh_token.clone())))
            .filter(account::Column::Id.eq(account.id));
        if let Some(presented) = rotating {
            store = store.filter(account::Column::RefreshToken.eq(presented));
        }

        let result = store.exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(match rotating {
                Some(_) => {
                    warn!(account_id = %account.id, "Rejected stale refresh token");
                    ServiceError::Unauthorized("Refresh token is expired or used".to_string())
                }
                None => ServiceError::not_found("User does not exist"),
            });
        }

        info!(account_id = %account.id, "Session opened");

        Ok(Session {
            account: account.into(),
            access_token,
            refresh_token,
        })
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

fn normalize_email(raw: &str) -> Result<String, ServiceError> {
    let email = require_text("email", raw)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ServiceError::invalid(format!("Invalid email: {raw}"))),
    }
}

fn conflict_or_db(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict("User with email or username already exists".to_string())
        }
        _ => err.into(),
    }
}

async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Upstream(format!("Password hashing task failed: {e}")))?
}

async fn verify_blocking(password: String, phc: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .map_err(|e| ServiceError::Upstream(format!("Password check task failed: {e}")))
}
