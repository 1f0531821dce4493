use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    response::ClientUser,
    services::{ProfilePatch, UserService},
};
use axum::{Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    /// The client sends `false` once the first-login tour is done.
    pub is_first_login: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: ClientUser,
}

/// The account behind the bearer token.
#[utoipa::path(
    get,
    path = "/users/this",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = AppError),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserService::new(db)
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserResponse {
        user: ClientUser::from(user),
    }))
}

#[utoipa::path(
    put,
    path = "/users",
    request_body = EditUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 401, description = "Not authenticated", body = AppError),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<EditUserRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let user = UserService::new(db)
        .update_profile(
            auth_user.user_id,
            ProfilePatch {
                first_name: payload.first_name,
                last_name: payload.last_name,
                profile_image: payload.profile_image,
                is_first_login: payload.is_first_login,
            },
        )
        .await?;

    Ok(Json(UserResponse {
        user: ClientUser::from(user),
    }))
}
