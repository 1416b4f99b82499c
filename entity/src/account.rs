//! Registered account. Every channel is an account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lowercased handle, unique across accounts
    #[sea_orm(unique)]
    pub handle: String,

    /// Lowercased email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,

    pub display_name: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub avatar_url: String,
    pub avatar_public_id: String,

    pub cover_url: Option<String>,
    pub cover_public_id: Option<String>,

    /// Currently valid refresh token, cleared on logout
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video::Entity")]
    Video,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
