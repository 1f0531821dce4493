use anyhow::Result;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

static JWT_CONFIG: OnceLock<crate::config::jwt::JwtConfig> = OnceLock::new();

/// Initialize JWT config from environment. Must be called once at startup.
pub fn init_jwt_config(config: crate::config::jwt::JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))?;
    Ok(())
}

fn get_config() -> &'static crate::config::jwt::JwtConfig {
    JWT_CONFIG
        .get()
        .expect("JWT config not initialized — call init_jwt_config() at startup")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

/// Bearer token for an authenticated session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user id
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// Embedded in the email-verification link; looked up by the token
/// string itself, the claims only bind it to the signup username.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// Embedded in the reset-password link. Must also byte-match the value
/// persisted on the user row (single use).
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String, // user id
    pub exp: usize,
    pub iat: usize,
}

pub fn encode_session_token(user_id: i32, username: &str) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    encode_claims(&SessionClaims {
        sub: user_id.to_string(),
        username: username.to_owned(),
        exp: now + config.session_token_expiry as usize,
        iat: now,
    })
}

pub fn encode_verification_token(username: &str) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    encode_claims(&VerificationClaims {
        username: username.to_owned(),
        exp: now + config.verification_token_expiry as usize,
        iat: now,
    })
}

pub fn encode_reset_token(user_id: i32) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    encode_claims(&ResetClaims {
        sub: user_id.to_string(),
        exp: now + config.reset_token_expiry as usize,
        iat: now,
    })
}

pub fn reset_token_expiry_hours() -> u64 {
    get_config().reset_token_expiry / 3600
}

pub fn decode_session_token(token: &str) -> Result<SessionClaims, TokenError> {
    decode_claims(token)
}

pub fn decode_verification_token(token: &str) -> Result<VerificationClaims, TokenError> {
    decode_claims(token)
}

pub fn decode_reset_token(token: &str) -> Result<ResetClaims, TokenError> {
    decode_claims(token)
}

fn encode_claims<T: Serialize>(claims: &T) -> Result<String> {
    let config = get_config();
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
}

fn decode_claims<T: DeserializeOwned>(token: &str) -> Result<T, TokenError> {
    let config = get_config();
    decode::<T>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}
