pub mod auth;
pub mod security;

pub use auth::{auth_middleware, require_admin, AuthUser};
pub use security::security_headers_middleware;
