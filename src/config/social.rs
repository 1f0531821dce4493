use std::env;

/// Google OAuth2 application credentials.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleConfig {
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = env::var("GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:8080/login/google".to_string());
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

/// Facebook app credentials used for Graph API token introspection.
#[derive(Debug, Clone)]
pub struct FacebookConfig {
    pub app_id: String,
    pub app_secret: String,
}

impl FacebookConfig {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            app_id: env::var("FACEBOOK_APP_ID").ok()?,
            app_secret: env::var("FACEBOOK_APP_SECRET").ok()?,
        })
    }
}
