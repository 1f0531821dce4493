mod common;

use serde_json::Value;

#[tokio::test]
async fn signup_verify_and_login() {
    let app = common::spawn_app().await;

    // Signup
    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({
            "username": "Alice@Example.com ",
            "firstName": "Alice",
            "lastName": "Archer",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    // Username was normalized on the way in
    assert_eq!(body["user"]["username"], "alice@example.com");
    assert_eq!(body["user"]["password"], true);
    assert!(body["user"]["_id"].as_i64().is_some());
    assert!(body["user"].get("passwordHash").is_none());

    // Not verified yet: login is refused
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "You haven't verified your email yet. Please verify it first to login."
    );

    // Verify via the emailed token, then login succeeds
    let token = common::verification_token_for(&app, "alice@example.com").await;
    let resp = app
        .client
        .delete(app.url(&format!("/auth/verification-token/{token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Your email address is verified successfully. You can login now"
    );

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "alice@example.com");

    // Verification token is gone from the account
    let user = common::find_user(&app, "alice@example.com").await;
    assert!(user.is_verified);
    assert!(user.verification_token.is_none());
}

#[tokio::test]
async fn duplicate_signup_reports_username_field() {
    let app = common::spawn_app().await;

    for _ in 0..2 {
        let resp = app
            .client
            .post(app.url("/auth/signup"))
            .json(&serde_json::json!({
                "username": "bob@example.com",
                "firstName": "Bob",
                "password": "password_123"
            }))
            .send()
            .await
            .unwrap();
        if resp.status() == 201 {
            continue;
        }
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Already has user with given username");
        assert_eq!(
            body["errors"]["username"],
            "Already has user with given username"
        );
        return;
    }
    panic!("second signup should have been rejected");
}

#[tokio::test]
async fn signup_validation_reports_fields() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({
            "username": "not-an-email",
            "firstName": "X",
            "password": "short"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["username"].as_str().is_some());
    assert!(body["errors"]["password"].as_str().is_some());
}

#[tokio::test]
async fn login_with_unknown_user_reports_username_field() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "ghost@example.com",
            "password": "whatever_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No user with given username");
    assert_eq!(body["errors"]["username"], "No user with given username");
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = common::spawn_app().await;
    common::signup_and_login(&app, "carol@example.com", "password_123").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "carol@example.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Username and password does not match");
}

#[tokio::test]
async fn username_availability_probe() {
    let app = common::spawn_app().await;
    common::signup_and_login(&app, "dave@example.com", "password_123").await;

    let resp = app
        .client
        .get(app.url("/auth/username/Dave@Example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["user"]["_id"].as_i64().is_some());

    let resp = app
        .client
        .get(app.url("/auth/username/free@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn garbage_verification_token_is_rejected() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .delete(app.url("/auth/verification-token/not-a-real-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid request");
}

#[tokio::test]
async fn well_signed_but_unknown_verification_token_is_rejected() {
    let app = common::spawn_app().await;

    // Decodes fine but no account carries it anymore
    let token = gatehouse::utils::encode_verification_token("nobody@example.com").unwrap();
    let resp = app
        .client
        .delete(app.url(&format!("/auth/verification-token/{token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn password_reset_round_trip_is_single_use() {
    let app = common::spawn_app().await;
    common::signup_and_login(&app, "erin@example.com", "old_password_1").await;

    // Request: token gets persisted on the row (SMTP is not configured
    // in tests, sending degrades to a no-op)
    let resp = app
        .client
        .post(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({ "username": "erin@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "An account recovery link has been sent to your email inbox"
    );

    let user = common::find_user(&app, "erin@example.com").await;
    let reset_token = user.reset_password_token.expect("reset token persisted");

    // Complete
    let resp = app
        .client
        .put(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({
            "userId": user.id,
            "token": reset_token,
            "password": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Successfully reset password");

    // Old password is out, new one works
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "erin@example.com",
            "password": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The same link cannot be used again
    let resp = app
        .client
        .put(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({
            "userId": user.id,
            "token": reset_token,
            "password": "another_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Reset password is not requested for this user"
    );
}

#[tokio::test]
async fn superseded_reset_token_is_rejected() {
    let app = common::spawn_app().await;
    common::signup_and_login(&app, "frank@example.com", "password_123").await;

    // First request
    app.client
        .post(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({ "username": "frank@example.com" }))
        .send()
        .await
        .unwrap();
    let first_token = common::find_user(&app, "frank@example.com")
        .await
        .reset_password_token
        .unwrap();

    // A second request replaces the stored token
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    app.client
        .post(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({ "username": "frank@example.com" }))
        .send()
        .await
        .unwrap();
    let user = common::find_user(&app, "frank@example.com").await;
    assert_ne!(user.reset_password_token.as_deref(), Some(first_token.as_str()));

    let resp = app
        .client
        .put(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({
            "userId": user.id,
            "token": first_token,
            "password": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid reset password URL");
}

#[tokio::test]
async fn reset_request_for_unknown_user_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/reset-password-token"))
        .json(&serde_json::json!({ "username": "ghost@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["username"], "No user with given username");
}

#[tokio::test]
async fn authenticated_password_update() {
    let app = common::spawn_app().await;
    let token = common::signup_and_login(&app, "grace@example.com", "old_password_1").await;

    // Wrong current password
    let resp = app
        .client
        .put(app.url("/auth/password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "currentPassword": "not_the_password",
            "newPassword": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Please enter correct password");

    // Correct current password
    let resp = app
        .client
        .put(app.url("/auth/password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "currentPassword": "old_password_1",
            "newPassword": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Successfully updated password");
    assert_eq!(body["user"]["password"], true);

    // New password is live
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "grace@example.com",
            "password": "new_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn password_update_requires_auth() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .put(app.url("/auth/password"))
        .json(&serde_json::json!({
            "currentPassword": "a_password_1",
            "newPassword": "b_password_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
