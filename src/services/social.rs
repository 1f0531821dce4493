use crate::{
    error::AppResult,
    models::{social_login, user, SocialLogin, UserModel},
    services::{CreateUser, NewSocialLogin, UserService},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Provider-normalized identity, produced by `ProviderClient` whichever
/// entry point (OAuth2 code, One Tap credential, Facebook token) it
/// came through.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub provider: &'static str,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: String,
    pub token: String,
    pub meta: serde_json::Value,
}

pub struct SocialLoginService {
    db: DatabaseConnection,
}

impl SocialLoginService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve a provider identity to a local account, creating one on
    /// first sight. `referred_code` only applies to that first sight.
    ///
    /// Existing accounts are refreshed from the provider: the per-
    /// provider entry is upserted, names follow the provider
    /// unconditionally, and the profile image is replaced only when the
    /// stored one is empty or itself provider-hosted (an `http(s)` URL),
    /// so a locally uploaded image is never clobbered.
    pub async fn resolve(
        &self,
        profile: SocialProfile,
        referred_code: Option<String>,
    ) -> AppResult<UserModel> {
        let users = UserService::new(self.db.clone());
        let username = UserService::normalize_username(&profile.email);

        let Some(existing) = users.find_by_username(&username).await? else {
            return users
                .create_user(
                    CreateUser {
                        username,
                        first_name: profile.first_name,
                        last_name: profile.last_name,
                        password: String::new(),
                        role: None,
                        referred_code,
                        profile_image: Some(profile.profile_image),
                        verification_token: None,
                        is_verified: true,
                        is_first_login: true,
                    },
                    Some(NewSocialLogin {
                        provider: profile.provider.to_string(),
                        token: profile.token,
                        meta: profile.meta,
                    }),
                )
                .await;
        };

        self.upsert_entry(existing.id, &profile).await?;

        let now = chrono::Utc::now().naive_utc();
        let replace_image = match existing.profile_image.as_deref() {
            None | Some("") => true,
            Some(stored) => stored.starts_with("http"),
        };

        let mut active: user::ActiveModel = existing.into();
        active.first_name = sea_orm::ActiveValue::Set(profile.first_name);
        active.last_name = sea_orm::ActiveValue::Set(profile.last_name);
        if replace_image && !profile.profile_image.is_empty() {
            active.profile_image = sea_orm::ActiveValue::Set(Some(profile.profile_image));
        }
        active.updated_at = sea_orm::ActiveValue::Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// One entry per (user, provider): refresh the token and metadata
    /// in place, or link the provider on first use.
    async fn upsert_entry(&self, user_id: i32, profile: &SocialProfile) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        let existing = SocialLogin::find()
            .filter(social_login::Column::UserId.eq(user_id))
            .filter(social_login::Column::Provider.eq(profile.provider))
            .one(&self.db)
            .await?;

        match existing {
            Some(entry) => {
                let mut active: social_login::ActiveModel = entry.into();
                active.token = sea_orm::ActiveValue::Set(profile.token.clone());
                active.meta = sea_orm::ActiveValue::Set(profile.meta.clone());
                active.updated_at = sea_orm::ActiveValue::Set(now);
                active.update(&self.db).await?;
            }
            None => {
                social_login::ActiveModel {
                    user_id: sea_orm::ActiveValue::Set(user_id),
                    provider: sea_orm::ActiveValue::Set(profile.provider.to_string()),
                    token: sea_orm::ActiveValue::Set(profile.token.clone()),
                    meta: sea_orm::ActiveValue::Set(profile.meta.clone()),
                    created_at: sea_orm::ActiveValue::Set(now),
                    updated_at: sea_orm::ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
            }
        }
        Ok(())
    }
}
