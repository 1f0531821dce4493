use crate::{
    error::{AppError, AppResult},
    models::{social_login, user, SocialLogin, SocialLoginModel, User, UserModel},
    utils::{generate_referral_code, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use sea_orm::sea_query::Expr;

pub const ADMIN_USERNAME: &str = "admin";

pub struct UserService {
    db: DatabaseConnection,
}

/// Data for a new identity record. `password` is the plain text (empty
/// for social-only accounts); hashing happens inside `create_user`.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: Option<String>,
    pub referred_code: Option<String>,
    pub profile_image: Option<String>,
    pub verification_token: Option<String>,
    pub is_verified: bool,
    pub is_first_login: bool,
}

/// New social identity persisted together with the user it links to.
#[derive(Debug, Clone)]
pub struct NewSocialLogin {
    pub provider: String,
    pub token: String,
    pub meta: serde_json::Value,
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    pub is_first_login: Option<bool>,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Usernames are email-shaped and compared case-insensitively.
    pub fn normalize_username(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Insert a new identity, optionally with an initial social login.
    /// The username-uniqueness pre-check lives in the orchestrator; a
    /// concurrent insert still surfaces here as `DuplicateUsername` via
    /// the unique constraint.
    pub async fn create_user(
        &self,
        data: CreateUser,
        social: Option<NewSocialLogin>,
    ) -> AppResult<UserModel> {
        let role = data.role.unwrap_or_else(|| user::ROLE_NON_ADMIN.to_string());

        if data.is_verified && role != user::ROLE_ADMIN && social.is_none() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "`is_verified` can be true initially for admins or social-login only"
            )));
        }

        let password_hash = if data.password.is_empty() {
            String::new()
        } else {
            hash_password(&data.password)?
        };

        let now = chrono::Utc::now().naive_utc();
        let new_user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(data.username),
            first_name: sea_orm::ActiveValue::Set(data.first_name),
            last_name: sea_orm::ActiveValue::Set(data.last_name),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            role: sea_orm::ActiveValue::Set(role),
            referral_code: sea_orm::ActiveValue::Set(generate_referral_code()),
            referred_code: sea_orm::ActiveValue::Set(data.referred_code),
            profile_image: sea_orm::ActiveValue::Set(data.profile_image),
            verification_token: sea_orm::ActiveValue::Set(data.verification_token),
            reset_password_token: sea_orm::ActiveValue::Set(None),
            is_verified: sea_orm::ActiveValue::Set(data.is_verified),
            is_first_login: sea_orm::ActiveValue::Set(data.is_first_login),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        let created = match new_user.insert(&txn).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => return Err(AppError::DuplicateUsername),
            Err(e) => return Err(e.into()),
        };

        if let Some(entry) = social {
            social_login::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(created.id),
                provider: sea_orm::ActiveValue::Set(entry.provider),
                token: sea_orm::ActiveValue::Set(entry.token),
                meta: sea_orm::ActiveValue::Set(entry.meta),
                created_at: sea_orm::ActiveValue::Set(now),
                updated_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<UserModel>> {
        Ok(User::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserModel>> {
        Ok(User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Lookup by the verification token string itself, not by its claims.
    pub async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<UserModel>> {
        Ok(User::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await?)
    }

    /// Linked social identities, in link order.
    pub async fn social_logins_for(&self, user_id: i32) -> AppResult<Vec<SocialLoginModel>> {
        Ok(SocialLogin::find()
            .filter(social_login::Column::UserId.eq(user_id))
            .order_by_asc(social_login::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn set_verified(&self, id: i32) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        User::update_many()
            .col_expr(user::Column::IsVerified, Expr::value(true))
            .col_expr(
                user::Column::VerificationToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Persist (or clear, with `None`) the reset-password token.
    pub async fn set_reset_token(&self, id: i32, token: Option<String>) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        User::update_many()
            .col_expr(user::Column::ResetPasswordToken, Expr::value(token))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Single-use reset completion as a conditional update: the new hash
    /// is written only where the stored token still equals `token`, so
    /// two racing completions cannot both succeed. Resetting via the
    /// emailed link also proves mailbox ownership, hence `is_verified`.
    /// Returns false when the token was already consumed.
    pub async fn consume_reset_token(
        &self,
        id: i32,
        token: &str,
        new_password_hash: String,
    ) -> AppResult<bool> {
        let now = chrono::Utc::now().naive_utc();
        let result = User::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(new_password_hash))
            .col_expr(
                user::Column::ResetPasswordToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(user::Column::IsVerified, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::ResetPasswordToken.eq(token))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Change password for an authenticated user after re-checking the
    /// current one.
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<UserModel> {
        let user = self.find_by_id(user_id).await?.ok_or(AppError::NotFound)?;

        if user.password_hash.is_empty() {
            let providers = self.social_provider_names(user_id).await?;
            return Err(AppError::SocialOnlyAccount(providers));
        }

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::IncorrectPassword);
        }

        let new_hash = hash_password(new_password)?;
        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = sea_orm::ActiveValue::Set(new_hash);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        Ok(active.update(&self.db).await?)
    }

    pub async fn update_profile(&self, user_id: i32, patch: ProfilePatch) -> AppResult<UserModel> {
        let user = self.find_by_id(user_id).await?.ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        if let Some(first_name) = patch.first_name {
            active.first_name = sea_orm::ActiveValue::Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = sea_orm::ActiveValue::Set(last_name);
        }
        if let Some(profile_image) = patch.profile_image {
            active.profile_image = sea_orm::ActiveValue::Set(Some(profile_image));
        }
        if let Some(is_first_login) = patch.is_first_login {
            active.is_first_login = sea_orm::ActiveValue::Set(is_first_login);
        }
        active.updated_at = sea_orm::ActiveValue::Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Provider names joined for the "social-only account" login error,
    /// e.g. "Google & Facebook".
    pub async fn social_provider_names(&self, user_id: i32) -> AppResult<String> {
        let names: Vec<String> = self
            .social_logins_for(user_id)
            .await?
            .into_iter()
            .map(|s| s.provider)
            .collect();
        Ok(names.join(" & "))
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("duplicate key") || message.contains("unique constraint")
}
