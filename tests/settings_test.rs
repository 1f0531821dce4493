mod common;

use serde_json::Value;

#[tokio::test]
async fn settings_default_to_active_site() {
    let mut app = common::spawn_app().await;
    let token = common::signup_and_login(&app, "jane@example.com", "password_123").await;
    common::make_admin(&app, "jane@example.com").await;

    let resp = app
        .client
        .get(app.url("/settings"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["siteIsActive"], true);

    // Reads never publish update events
    assert!(app.settings_rx.try_recv().is_err());
}

#[tokio::test]
async fn non_admin_only_sees_activity_flag() {
    let app = common::spawn_app().await;
    let token = common::signup_and_login(&app, "kate@example.com", "password_123").await;

    let resp = app
        .client
        .get(app.url("/settings"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["siteIsActive"], true);
    assert!(body.get("_id").is_none());
    assert!(body.get("updatedBy").is_none());
}

#[tokio::test]
async fn settings_write_is_admin_only() {
    let app = common::spawn_app().await;
    let token = common::signup_and_login(&app, "liam@example.com", "password_123").await;

    let resp = app
        .client
        .post(app.url("/settings"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "siteIsActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    // Forbidden carries an empty body
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_write_replaces_document_and_publishes() {
    let mut app = common::spawn_app().await;
    let token = common::signup_and_login(&app, "mona@example.com", "password_123").await;
    common::make_admin(&app, "mona@example.com").await;
    let admin = common::find_user(&app, "mona@example.com").await;

    let resp = app
        .client
        .post(app.url("/settings"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "siteIsActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["settings"]["siteIsActive"], false);
    assert_eq!(body["settings"]["updatedBy"], admin.id);

    // The scheduler side of the channel sees the update
    let update = app.settings_rx.recv().await.expect("update published");
    assert!(!update.site_is_active);
    assert_eq!(update.updated_by, Some(admin.id));

    // Second write replaces rather than accumulates
    let resp = app
        .client
        .post(app.url("/settings"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "siteIsActive": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    use sea_orm::{EntityTrait, PaginatorTrait};
    let count = gatehouse::models::Settings::find()
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let resp = app
        .client
        .get(app.url("/settings"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["siteIsActive"], true);
    assert!(body["_id"].as_i64().is_some());
}
