use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(protected)
}

/// Unauthenticated auth routes: signup, logins, verification, reset.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/auth/username/{username}",
            routing::get(handlers::check_username),
        )
        .route("/auth/signup", routing::post(handlers::signup))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/login/google/oauth2",
            routing::post(handlers::login_google_oauth2),
        )
        .route(
            "/auth/login/google/one-tap",
            routing::post(handlers::login_google_one_tap),
        )
        .route("/auth/login/fb", routing::post(handlers::login_facebook))
        .route(
            "/auth/reset-password-token",
            routing::post(handlers::request_password_reset)
                .put(handlers::complete_password_reset),
        )
        .route(
            "/auth/verification-token/{token}",
            routing::delete(handlers::verify_email),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Routes behind the session token.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/password", routing::put(handlers::update_password))
        .route("/users/this", routing::get(handlers::get_current_user))
        .route("/users", routing::put(handlers::update_profile))
        .route(
            "/settings",
            routing::get(handlers::get_settings).post(handlers::set_settings),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
