pub mod auth;
pub mod settings;
pub mod user;

pub use auth::*;
pub use settings::*;
pub use user::*;
