use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Email-shaped, stored lowercased and trimmed.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty string for social-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub referral_code: String,
    pub referred_code: Option<String>,
    pub profile_image: Option<String>,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    pub is_verified: bool,
    pub is_first_login: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_NON_ADMIN: &str = "non-admin";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::social_login::Entity")]
    SocialLogin,
}

impl Related<super::social_login::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialLogin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
