use std::env;

/// Bootstrap credentials for the built-in `admin` account.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub password: String,
}

impl AdminConfig {
    /// Returns None when no admin password is configured, in which case
    /// the admin account (and the settings toggle acting as it) is skipped.
    pub fn from_env() -> Option<Self> {
        let password = env::var("ADMIN_PASSWORD").ok()?;
        if password.is_empty() {
            return None;
        }
        Some(Self { password })
    }
}
