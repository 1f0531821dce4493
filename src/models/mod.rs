pub mod settings;
pub mod social_login;
pub mod user;

pub use settings::{Entity as Settings, Model as SettingsModel};
pub use social_login::{Entity as SocialLogin, Model as SocialLoginModel};
pub use user::{Entity as User, Model as UserModel};
