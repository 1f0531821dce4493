use crate::{
    config::social::{FacebookConfig, GoogleConfig},
    error::{AppError, AppResult},
    middleware::AuthUser,
    response::{ClientUser, LoginResponse, MessageResponse},
    services::{
        AuthService, EmailService, ProviderClient, SignupData, UserService,
    },
};
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Email address used as the login name
    #[validate(email(message = "Username must be a valid email address"))]
    pub username: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Password (min 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Referral code of the user who invited this one
    pub referred_code: Option<String>,
    /// Client page to land on after verifying
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub user: ClientUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsernameCheckResponse {
    pub user: UserRef,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleOauth2Request {
    /// Single-use authorization code from the OAuth2 redirect
    pub code: String,
    pub referred_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleOneTapRequest {
    /// ID token credential from the One Tap prompt
    pub credential: String,
    pub referred_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacebookLoginRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_image: String,
    /// Facebook user id the access token must belong to
    #[serde(rename = "id")]
    pub user_id: String,
    /// Client-obtained Graph API access token
    #[serde(rename = "token")]
    pub access_token: String,
    pub referred_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetRequestBody {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetCompleteBody {
    pub user_id: i32,
    pub token: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatePasswordResponse {
    pub user: ClientUser,
    pub message: String,
}

/// Username availability probe used by the signup form.
#[utoipa::path(
    get,
    path = "/auth/username/{username}",
    params(("username" = String, Path, description = "Username to look up")),
    responses(
        (status = 200, description = "Username is taken", body = UsernameCheckResponse),
        (status = 404, description = "Username is available"),
    ),
    tag = "auth"
)]
pub async fn check_username(
    Extension(db): Extension<DatabaseConnection>,
    Path(username): Path<String>,
) -> AppResult<Json<UsernameCheckResponse>> {
    let username = UserService::normalize_username(&username);
    let user = UserService::new(db)
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(UsernameCheckResponse {
        user: UserRef { id: user.id },
    }))
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = SignupResponse),
        (status = 400, description = "Validation error or username taken", body = AppError),
    ),
    tag = "auth"
)]
pub async fn signup(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let user = AuthService::new(db)
        .signup(
            SignupData {
                username: payload.username,
                first_name: payload.first_name,
                last_name: payload.last_name,
                password: payload.password,
                referred_code: payload.referred_code,
                redirect: payload.redirect,
            },
            &email_service,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: ClientUser::from(user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Unknown user, unverified account or wrong password", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (user, token) = AuthService::new(db)
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: ClientUser::from(user),
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/login/google/oauth2",
    request_body = GoogleOauth2Request,
    responses(
        (status = 201, description = "Logged in via Google", body = LoginResponse),
        (status = 400, description = "Code rejected by Google", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_google_oauth2(
    Extension(db): Extension<DatabaseConnection>,
    Extension(provider): Extension<ProviderClient>,
    Json(payload): Json<GoogleOauth2Request>,
) -> AppResult<impl IntoResponse> {
    let config = GoogleConfig::from_env().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Google login is not configured"))
    })?;

    let profile = provider.google_oauth2_profile(&config, &payload.code).await?;
    social_session(db, profile, payload.referred_code).await
}

#[utoipa::path(
    post,
    path = "/auth/login/google/one-tap",
    request_body = GoogleOneTapRequest,
    responses(
        (status = 201, description = "Logged in via Google One Tap", body = LoginResponse),
        (status = 400, description = "Malformed credential", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_google_one_tap(
    Extension(db): Extension<DatabaseConnection>,
    Extension(provider): Extension<ProviderClient>,
    Json(payload): Json<GoogleOneTapRequest>,
) -> AppResult<impl IntoResponse> {
    let profile = provider.google_one_tap_profile(&payload.credential)?;
    social_session(db, profile, payload.referred_code).await
}

#[utoipa::path(
    post,
    path = "/auth/login/fb",
    request_body = FacebookLoginRequest,
    responses(
        (status = 201, description = "Logged in via Facebook", body = LoginResponse),
        (status = 400, description = "Access token rejected", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_facebook(
    Extension(db): Extension<DatabaseConnection>,
    Extension(provider): Extension<ProviderClient>,
    Json(payload): Json<FacebookLoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let config = FacebookConfig::from_env().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Facebook login is not configured"))
    })?;

    provider
        .verify_facebook_token(&config, &payload.access_token, &payload.user_id)
        .await?;

    let profile = provider.facebook_profile(
        payload.email,
        payload.first_name,
        payload.last_name,
        payload.profile_image,
        payload.user_id,
        payload.access_token,
    );
    social_session(db, profile, payload.referred_code).await
}

async fn social_session(
    db: DatabaseConnection,
    profile: crate::services::SocialProfile,
    referred_code: Option<String>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let provider_name = profile.provider;
    let provider_image = profile.profile_image.clone();
    let (user, token) = AuthService::new(db)
        .social_login(profile, referred_code)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            user: ClientUser::with_social_login(user, provider_name, &provider_image),
            token,
        }),
    ))
}

/// Consuming the verification link is modelled as deleting the token.
#[utoipa::path(
    delete,
    path = "/auth/verification-token/{token}",
    params(("token" = String, Path, description = "Verification token from the email link")),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Expired or invalid token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn verify_email(
    Extension(db): Extension<DatabaseConnection>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    AuthService::new(db).verify_email(&token).await?;

    Ok(Json(MessageResponse::new(
        "Your email address is verified successfully. You can login now",
    )))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password-token",
    request_body = ResetRequestBody,
    responses(
        (status = 200, description = "Recovery email sent", body = MessageResponse),
        (status = 400, description = "Unknown username", body = AppError),
    ),
    tag = "auth"
)]
pub async fn request_password_reset(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<ResetRequestBody>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;

    AuthService::new(db)
        .request_password_reset(&payload.username, &email_service)
        .await?;

    Ok(Json(MessageResponse::new(
        "An account recovery link has been sent to your email inbox",
    )))
}

#[utoipa::path(
    put,
    path = "/auth/reset-password-token",
    request_body = ResetCompleteBody,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Expired, mismatched or already used token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn complete_password_reset(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<ResetCompleteBody>,
) -> AppResult<Json<MessageResponse>> {
    payload.validate()?;

    AuthService::new(db)
        .complete_password_reset(payload.user_id, &payload.token, &payload.password)
        .await?;

    Ok(Json(MessageResponse::new("Successfully reset password")))
}

#[utoipa::path(
    put,
    path = "/auth/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UpdatePasswordResponse),
        (status = 400, description = "Current password is wrong", body = AppError),
        (status = 401, description = "Not authenticated", body = AppError),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_password(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<UpdatePasswordResponse>> {
    payload.validate()?;

    let user = UserService::new(db)
        .change_password(
            auth_user.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(UpdatePasswordResponse {
        user: ClientUser::from(user),
        message: "Successfully updated password".to_string(),
    }))
}
