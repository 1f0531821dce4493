use crate::{
    error::AppError,
    models::{user, User},
    utils::jwt::decode_session_token,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Extracted user information from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == user::ROLE_ADMIN
    }
}

/// Session authentication middleware.
///
/// Verifies the bearer token from the Authorization header, checks the
/// account still exists, and adds user info to request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_session_token(&token).map_err(|_| AppError::Unauthorized)?;
    let user_id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    // The token may outlive the account; re-check on every request.
    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let auth_user = AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Verify the current user has admin role.
pub fn require_admin(auth_user: &AuthUser) -> Result<(), AppError> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Extractor for AuthUser from request extensions.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
