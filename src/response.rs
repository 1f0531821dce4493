use crate::models::UserModel;
use serde::Serialize;
use utoipa::ToSchema;

/// User shape sent to the client. The password hash never leaves the
/// server; the client only learns whether a local password exists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientUser {
    #[serde(rename = "_id")]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub role: String,
    pub referral_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub is_first_login: bool,
    /// True when the account has a local password.
    pub password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_login_type: Option<String>,
}

impl From<UserModel> for ClientUser {
    fn from(user: UserModel) -> Self {
        let first_name = if user.first_name.is_empty() {
            user.username.clone()
        } else {
            user.first_name
        };
        Self {
            id: user.id,
            first_name,
            last_name: user.last_name,
            username: user.username,
            role: user.role,
            referral_code: user.referral_code,
            referred_code: user.referred_code,
            profile_image: user.profile_image,
            is_first_login: user.is_first_login,
            password: !user.password_hash.is_empty(),
            social_login_type: None,
        }
    }
}

impl ClientUser {
    pub fn with_social_login(user: UserModel, provider: &str, profile_image: &str) -> Self {
        let mut client = Self::from(user);
        client.profile_image = Some(profile_image.to_string());
        client.social_login_type = Some(provider.to_string());
        client
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: ClientUser,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
