mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;
mod utils;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use services::{ProviderClient, SettingsEvents, SettingsScheduler};
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        crate::handlers::auth::check_username,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::login_google_oauth2,
        crate::handlers::auth::login_google_one_tap,
        crate::handlers::auth::login_facebook,
        crate::handlers::auth::verify_email,
        crate::handlers::auth::request_password_reset,
        crate::handlers::auth::complete_password_reset,
        crate::handlers::auth::update_password,
        // User routes
        crate::handlers::user::get_current_user,
        crate::handlers::user::update_profile,
        // Settings routes
        crate::handlers::settings::get_settings,
        crate::handlers::settings::set_settings,
    ),
    components(
        schemas(
            crate::error::AppError,
            crate::response::ClientUser,
            crate::response::LoginResponse,
            crate::response::MessageResponse,
            // Auth
            crate::handlers::auth::SignupRequest,
            crate::handlers::auth::SignupResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::UsernameCheckResponse,
            crate::handlers::auth::UserRef,
            crate::handlers::auth::GoogleOauth2Request,
            crate::handlers::auth::GoogleOneTapRequest,
            crate::handlers::auth::FacebookLoginRequest,
            crate::handlers::auth::ResetRequestBody,
            crate::handlers::auth::ResetCompleteBody,
            crate::handlers::auth::UpdatePasswordRequest,
            crate::handlers::auth::UpdatePasswordResponse,
            // User
            crate::handlers::user::EditUserRequest,
            crate::handlers::user::UserResponse,
            // Settings
            crate::handlers::settings::SetSettingsRequest,
            crate::handlers::settings::SettingsView,
            crate::handlers::settings::PublicSettingsView,
            crate::handlers::settings::SettingsResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and account recovery"),
        (name = "users", description = "User profile operations"),
        (name = "settings", description = "Site settings operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let (jwt_config, db_config) = validate_config()?;
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Gatehouse API v{}...", env!("CARGO_PKG_VERSION"));

    let db = db_config.connect().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    services::ensure_admin(&db).await?;

    let email_service = services::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, emails will be skipped");
    }

    let provider_client = ProviderClient::new();

    // Settings channel: handlers publish, the scheduler is the one consumer.
    let (settings_events, settings_rx) = SettingsEvents::channel();
    let scheduler = SettingsScheduler::new(
        db.clone(),
        settings_events.clone(),
        settings_rx,
        config::scheduler::ToggleConfig::from_env(),
    );
    tokio::spawn(scheduler.run());

    let app = create_app()
        .layer(Extension(db))
        .layer(Extension(email_service))
        .layer(Extension(provider_client))
        .layer(Extension(settings_events));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config(
) -> anyhow::Result<(config::jwt::JwtConfig, config::database::DatabaseConfig)> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // Database settings are read here for early error; the actual
    // connection happens later
    let db_config = config::database::DatabaseConfig::from_env()?;

    Ok((jwt_config, db_config))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Gatehouse API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
