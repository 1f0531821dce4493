pub mod auth;
pub mod bootstrap_admin;
pub mod email;
pub mod provider;
pub mod scheduler;
pub mod settings;
pub mod social;
pub mod user;

pub use auth::{AuthService, SignupData};
pub use bootstrap_admin::ensure_admin;
pub use email::EmailService;
pub use provider::ProviderClient;
pub use scheduler::SettingsScheduler;
pub use settings::{SettingsEvents, SettingsService};
pub use social::{SocialLoginService, SocialProfile};
pub use user::{CreateUser, NewSocialLogin, ProfilePatch, UserService, ADMIN_USERNAME};
