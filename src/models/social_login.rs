use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One linked external identity. `(user_id, provider)` is unique, so a
/// repeated login through the same provider replaces the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "social_logins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// "Google" or "Facebook".
    pub provider: String,
    /// Opaque provider token from the last login.
    #[serde(skip_serializing)]
    pub token: String,
    /// Raw provider payload kept for audit/debugging.
    #[schema(value_type = Object)]
    pub meta: Json,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub const PROVIDER_GOOGLE: &str = "Google";
pub const PROVIDER_FACEBOOK: &str = "Facebook";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
