#![allow(dead_code)]

use gatehouse::services::{EmailService, ProviderClient, SettingsEvents};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::Once;
use tokio::sync::mpsc::UnboundedReceiver;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Every test hits from 127.0.0.1, rate limiting would trip instantly
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = gatehouse::config::jwt::JwtConfig::from_env().unwrap();
        let _ = gatehouse::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub settings_events: SettingsEvents,
    pub settings_rx: UnboundedReceiver<gatehouse::models::SettingsModel>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Boot the app on a random port against a fresh database. Defaults to
/// an in-memory SQLite database so the suite runs without any external
/// services; set TEST_DATABASE_URL to exercise Postgres instead.
pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url =
        std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    // A single connection keeps every query on the same in-memory DB.
    let mut options = sea_orm::ConnectOptions::new(database_url);
    options.max_connections(1);
    let db = sea_orm::Database::connect(options)
        .await
        .expect("Failed to connect to test database");

    gatehouse::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let email_service = EmailService::from_env();
    let provider_client = ProviderClient::new();
    let (settings_events, settings_rx) = SettingsEvents::channel();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(gatehouse::routes::create_routes())
        .layer(axum::middleware::from_fn(
            gatehouse::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(email_service))
        .layer(axum::extract::Extension(provider_client))
        .layer(axum::extract::Extension(settings_events.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        settings_events,
        settings_rx,
    }
}

/// Signup, pull the verification token straight from the row, verify,
/// then login. Returns the session token.
pub async fn signup_and_login(app: &TestApp, username: &str, password: &str) -> String {
    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({
            "username": username,
            "firstName": "Test",
            "lastName": "User",
            "password": password,
        }))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(resp.status(), 201, "signup should succeed");

    let token = verification_token_for(app, username).await;
    let resp = app
        .client
        .delete(app.url(&format!("/auth/verification-token/{token}")))
        .send()
        .await
        .expect("verify request failed");
    assert_eq!(resp.status(), 200, "verification should succeed");

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200, "login should succeed");

    let body: serde_json::Value = resp.json().await.unwrap();
    body["token"].as_str().expect("login returns token").to_string()
}

pub async fn verification_token_for(app: &TestApp, username: &str) -> String {
    let user = find_user(app, username).await;
    user.verification_token
        .expect("user should have a verification token")
}

pub async fn find_user(app: &TestApp, username: &str) -> gatehouse::models::UserModel {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    gatehouse::models::User::find()
        .filter(gatehouse::models::user::Column::Username.eq(username))
        .one(&app.db)
        .await
        .expect("user lookup failed")
        .expect("user should exist")
}

/// Promote an existing account to admin directly in the database.
pub async fn make_admin(app: &TestApp, username: &str) {
    use sea_orm::{ActiveModelTrait, ActiveValue};

    let user = find_user(app, username).await;
    let mut active: gatehouse::models::user::ActiveModel = user.into();
    active.role = ActiveValue::Set(gatehouse::models::user::ROLE_ADMIN.to_string());
    active.update(&app.db).await.expect("failed to promote user");
}
