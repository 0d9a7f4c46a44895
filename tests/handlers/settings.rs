//! Account settings over HTTP

use crate::common::{TEST_PASSWORD, TestApp, register_and_login};
use serde_json::{Value, json};

#[tokio::test]
async fn test_get_and_update_settings() {
    let app = TestApp::new("test_get_and_update_settings").await;
    let user = register_and_login(&app).await;

    let body: Value = app
        .client
        .get(app.url("/api/settings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["user"]["email"], user["email"]);
    assert!(body["user"]["username"].is_string());

    let new_email = app.db.generate_test_email();
    let response = app
        .client
        .post(app.url("/api/settings/update_profile"))
        .json(&json!({ "name": "Maria Clara", "email": new_email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["name"], "Maria Clara");
    assert_eq!(body["user"]["email"], new_email);
}

#[tokio::test]
async fn test_update_profile_email_taken_returns_409() {
    let app = TestApp::new("test_update_profile_email_taken_409").await;
    register_and_login(&app).await;
    let other = app.db.create_user(true).await;

    let response = app
        .client
        .post(app.url("/api/settings/update_profile"))
        .json(&json!({ "name": "Someone", "email": other.email }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already in use");
}

#[tokio::test]
async fn test_change_password_keeps_current_session() {
    let app = TestApp::new("test_change_password_keeps_session").await;
    let user = register_and_login(&app).await;

    let response = app
        .client
        .post(app.url("/api/settings/change_password"))
        .json(&json!({ "current_password": "wrong-password", "new_password": "anotherpass77" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .post(app.url("/api/settings/change_password"))
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "anotherpass77" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app.client.get(app.url("/api/settings")).send().await.unwrap();
    assert_eq!(response.status(), 200, "The session that changed the password stays valid");

    let fresh = TestApp::new_client();
    let response = fresh
        .post(app.url("/api/login"))
        .json(&json!({ "email": user["email"], "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = fresh
        .post(app.url("/api/login"))
        .json(&json!({ "email": user["email"], "password": "anotherpass77" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
