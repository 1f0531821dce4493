use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub session_token_expiry: u64,      // 30 days
    pub verification_token_expiry: u64, // 7 days
    pub reset_token_expiry: u64,        // 2 hours
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let session_token_expiry = env::var("JWT_SESSION_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30 * 24 * 3600); // 30 days

        let verification_token_expiry = env::var("JWT_VERIFICATION_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7 * 24 * 3600); // 7 days

        let reset_token_expiry = env::var("JWT_RESET_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2 * 3600); // 2 hours

        Ok(Self {
            secret,
            session_token_expiry,
            verification_token_expiry,
            reset_token_expiry,
        })
    }
}
