use std::env;
use std::time::Duration;

/// Periods for the recurring `siteIsActive` toggle. The job runs on the
/// shorter period while the site is active and the longer one while it
/// is inactive.
#[derive(Debug, Clone, Copy)]
pub struct ToggleConfig {
    pub active_period: Duration,
    pub inactive_period: Duration,
}

impl ToggleConfig {
    pub fn from_env() -> Self {
        let active_secs = env::var("SETTINGS_TOGGLE_ACTIVE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let inactive_secs = env::var("SETTINGS_TOGGLE_INACTIVE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        Self {
            active_period: Duration::from_secs(active_secs),
            inactive_period: Duration::from_secs(inactive_secs),
        }
    }

    pub fn period_for(&self, site_is_active: bool) -> Duration {
        if site_is_active {
            self.active_period
        } else {
            self.inactive_period
        }
    }
}
