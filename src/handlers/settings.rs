use crate::{
    error::{AppError, AppResult},
    middleware::{require_admin, AuthUser},
    models::SettingsModel,
    services::{SettingsEvents, SettingsService},
};
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSettingsRequest {
    pub site_is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    #[serde(rename = "_id")]
    pub id: i32,
    pub site_is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<i32>,
}

/// What everyone below admin is allowed to see.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettingsView {
    pub site_is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    pub settings: SettingsView,
}

impl From<SettingsModel> for SettingsView {
    fn from(model: SettingsModel) -> Self {
        Self {
            id: model.id,
            site_is_active: model.site_is_active,
            updated_by: model.updated_by,
        }
    }
}

#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Current settings; non-admins only see the activity flag", body = SettingsView),
        (status = 401, description = "Not authenticated", body = AppError),
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn get_settings(
    Extension(db): Extension<DatabaseConnection>,
    Extension(events): Extension<SettingsEvents>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsService::new(db, events).get().await?;

    if auth_user.is_admin() {
        Ok(Json(SettingsView::from(settings)).into_response())
    } else {
        Ok(Json(PublicSettingsView {
            site_is_active: settings.site_is_active,
        })
        .into_response())
    }
}

#[utoipa::path(
    post,
    path = "/settings",
    request_body = SetSettingsRequest,
    responses(
        (status = 201, description = "Settings replaced", body = SettingsResponse),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 403, description = "Not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn set_settings(
    Extension(db): Extension<DatabaseConnection>,
    Extension(events): Extension<SettingsEvents>,
    auth_user: AuthUser,
    Json(payload): Json<SetSettingsRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let settings = SettingsService::new(db, events)
        .set(payload.site_is_active, Some(auth_user.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SettingsResponse {
            settings: SettingsView::from(settings),
        }),
    ))
}
