use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Already has user with given username")]
    DuplicateUsername,

    #[error("No user with given username")]
    UserNotFound,

    #[error("You haven't verified your email yet. Please verify it first to login.")]
    NotVerified,

    #[error("This email is used for {0} login")]
    SocialOnlyAccount(String),

    #[error("Username and password does not match")]
    PasswordMismatch,

    #[error("Please enter correct password")]
    IncorrectPassword,

    #[error("{0}")]
    TokenExpired(String),

    #[error("{0}")]
    TokenInvalid(String),

    #[error("Reset password is not requested for this user")]
    ResetNotRequested,

    #[error("Invalid reset password URL")]
    ResetTokenMismatch,

    #[error("{0}")]
    ProviderTokenInvalid(String),

    #[error("Authorization code already used")]
    ProviderCredentialReused,

    #[error("Validation error")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl utoipa::ToSchema for AppError {
    fn name() -> std::borrow::Cow<'static, str> {
        "ErrorResponse".into()
    }
}

impl utoipa::PartialSchema for AppError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ErrorResponse::schema()
    }
}

impl AppError {
    /// Per-field errors sent alongside the message. The client binds this
    /// `{field: message}` map to form inputs.
    fn field_errors(&self) -> Option<BTreeMap<String, String>> {
        match self {
            AppError::DuplicateUsername | AppError::UserNotFound => Some(BTreeMap::from([(
                "username".to_string(),
                self.to_string(),
            )])),
            AppError::ProviderTokenInvalid(message) => {
                Some(BTreeMap::from([("token".to_string(), message.clone())]))
            }
            AppError::Validation(errors) => {
                let mut map = BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let message = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref())
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let message = if message.is_empty() {
                        format!("Invalid value for `{field}`")
                    } else {
                        message
                    };
                    map.insert(field.to_string(), message);
                }
                Some(map)
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            // Role and lookup failures carry no body.
            AppError::Forbidden => return StatusCode::FORBIDDEN.into_response(),
            AppError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            _ => StatusCode::BAD_REQUEST,
        };

        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        if status == StatusCode::BAD_REQUEST {
            tracing::warn!("Request failed: {}", message);
        }

        let body = ErrorResponse {
            success: false,
            errors: self.field_errors(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
