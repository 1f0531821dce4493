use crate::{
    error::{AppError, AppResult},
    models::UserModel,
    services::{
        CreateUser, EmailService, SocialLoginService, SocialProfile, UserService,
    },
    utils::{
        encode_reset_token, encode_session_token, encode_verification_token,
        hash_password,
        jwt::{decode_reset_token, decode_verification_token, TokenError},
    },
};
use sea_orm::DatabaseConnection;

pub struct AuthService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct SignupData {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub referred_code: Option<String>,
    pub redirect: Option<String>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    /// Create an unverified local account and mail the verification
    /// link. A mail failure is logged but does not fail the signup; the
    /// user can still be verified from a resent link later.
    pub async fn signup(&self, data: SignupData, email: &EmailService) -> AppResult<UserModel> {
        let users = self.users();
        let username = UserService::normalize_username(&data.username);

        if users.find_by_username(&username).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let token = encode_verification_token(&username)?;
        let user = users
            .create_user(
                CreateUser {
                    username,
                    first_name: data.first_name,
                    last_name: data.last_name,
                    password: data.password,
                    role: None,
                    referred_code: data.referred_code,
                    profile_image: None,
                    verification_token: Some(token.clone()),
                    is_verified: false,
                    is_first_login: true,
                },
                None,
            )
            .await?;

        if let Err(e) = email
            .send_account_email(
                &user.username,
                &user.first_name,
                &token,
                data.redirect.as_deref(),
            )
            .await
        {
            tracing::warn!("Failed to send verification email to {}: {e}", user.username);
        }

        Ok(user)
    }

    /// Local credential login. Checks run in order: the account must
    /// exist, be verified, have a password at all (social-only accounts
    /// have none), and the password must match.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(UserModel, String)> {
        let users = self.users();
        let username = UserService::normalize_username(username);

        let user = users
            .find_by_username(&username)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_verified {
            return Err(AppError::NotVerified);
        }
        if user.password_hash.is_empty() {
            let providers = users.social_provider_names(user.id).await?;
            return Err(AppError::SocialOnlyAccount(providers));
        }
        if !crate::utils::verify_password(password, &user.password_hash)? {
            return Err(AppError::PasswordMismatch);
        }

        let token = encode_session_token(user.id, &user.username)?;
        Ok((user, token))
    }

    /// Consume an email-verification token. The token is located by its
    /// own string, so a well-signed token that no row carries anymore
    /// (already used, or the account is gone) is simply invalid.
    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        decode_verification_token(token).map_err(|e| match e {
            TokenError::Expired => AppError::TokenExpired(
                "The verification token has been expired! Please try to signup again".to_string(),
            ),
            TokenError::Invalid => AppError::TokenInvalid("Invalid request".to_string()),
        })?;

        let users = self.users();
        let user = users
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| AppError::TokenInvalid("Invalid token".to_string()))?;

        users.set_verified(user.id).await
    }

    /// Mint a reset token, persist it on the account, then mail the
    /// link. When the mail cannot be sent the stored token is rolled
    /// back, so a dangling token never outlives a link nobody received.
    pub async fn request_password_reset(
        &self,
        username: &str,
        email: &EmailService,
    ) -> AppResult<()> {
        let users = self.users();
        let username = UserService::normalize_username(username);

        let user = users
            .find_by_username(&username)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let token = encode_reset_token(user.id)?;
        users.set_reset_token(user.id, Some(token.clone())).await?;

        if let Err(e) = email
            .send_reset_password_email(&user.username, &user.first_name, user.id, &token)
            .await
        {
            users.set_reset_token(user.id, None).await?;
            return Err(AppError::Internal(anyhow::anyhow!(
                "Failed to send reset password email: {e}"
            )));
        }
        Ok(())
    }

    /// Complete a reset from the emailed link. The submitted token must
    /// decode, belong to `user_id`, and byte-match the stored one; the
    /// match-and-clear is a single conditional update, so the link is
    /// single use even under concurrent submissions.
    pub async fn complete_password_reset(
        &self,
        user_id: i32,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let claims = decode_reset_token(token).map_err(|e| match e {
            TokenError::Expired => {
                AppError::TokenExpired("The reset password url has expired".to_string())
            }
            TokenError::Invalid => {
                AppError::TokenInvalid("Invalid reset password URL".to_string())
            }
        })?;
        if claims.sub != user_id.to_string() {
            return Err(AppError::TokenInvalid("Invalid reset password URL".to_string()));
        }

        let users = self.users();
        let user = users.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::TokenInvalid("No user present for this reset password url".to_string())
        })?;

        let stored = user.reset_password_token.ok_or(AppError::ResetNotRequested)?;
        if stored != token {
            return Err(AppError::ResetTokenMismatch);
        }

        let new_hash = hash_password(new_password)?;
        let consumed = users.consume_reset_token(user_id, token, new_hash).await?;
        if !consumed {
            // Lost a race with another submission of the same link.
            return Err(AppError::ResetTokenMismatch);
        }
        Ok(())
    }

    /// Social entry point shared by all three provider routes: resolve
    /// the provider identity, then issue a session like any login.
    pub async fn social_login(
        &self,
        profile: SocialProfile,
        referred_code: Option<String>,
    ) -> AppResult<(UserModel, String)> {
        let user = SocialLoginService::new(self.db.clone())
            .resolve(profile, referred_code)
            .await?;
        let token = encode_session_token(user.id, &user.username)?;
        Ok((user, token))
    }
}
