//! Registration, verification, login and logout over HTTP

use crate::common::{TEST_PASSWORD, TestApp, register_and_login, user_id};
use serde_json::{Value, json};

// ============================================================================
// Registration and verification
// ============================================================================

#[tokio::test]
async fn test_register_verify_login_flow() {
    let app = TestApp::new("test_register_verify_login_flow").await;
    let register = app.db.generate_test_user();

    let response = app
        .client
        .post(app.url("/api/register"))
        .json(&json!({
            "name": register.name,
            "username": register.username,
            "email": register.email,
            "password": register.password,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    // Unverified accounts cannot log in yet
    let response = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({ "email": register.email, "password": register.password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let code = app.test_db().verification_code(&register.email).await.unwrap();
    let response = app
        .client
        .post(app.url("/api/verify"))
        .json(&json!({ "email": register.email, "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email verified successfully! You can now login.");

    let response = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({ "email": register.email, "password": register.password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("Login sets the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{}=", app.config.sessions.cookie_name)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], register.email);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation_and_conflicts() {
    let app = TestApp::new("test_register_validation_conflicts").await;
    let register = app.db.generate_test_user();

    let response = app
        .client
        .post(app.url("/api/register"))
        .json(&json!({
            "name": register.name,
            "username": register.username,
            "email": "not-an-email",
            "password": register.password,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["email"].is_string());

    let payload = json!({
        "name": register.name,
        "username": register.username,
        "email": register.email,
        "password": register.password,
    });
    let first = app.client.post(app.url("/api/register")).json(&payload).send().await.unwrap();
    assert_eq!(first.status(), 200);

    let second = app.client.post(app.url("/api/register")).json(&payload).send().await.unwrap();
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_verify_with_wrong_code_is_rejected() {
    let app = TestApp::new("test_verify_with_wrong_code").await;
    let user = app.db.create_user(false).await;

    let response = app
        .client
        .post(app.url("/api/verify"))
        .json(&json!({ "email": user.email, "code": "000000" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired verification code");
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_login_with_wrong_password_returns_401() {
    let app = TestApp::new("test_login_wrong_password_401").await;
    let user = app.db.create_user(true).await;

    let response = app
        .client
        .post(app.url("/api/login"))
        .json(&json!({ "email": user.email, "password": format!("{}x", TEST_PASSWORD) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(response.headers().get("set-cookie").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_route_requires_session() {
    let app = TestApp::new("test_protected_route_requires_session").await;

    for path in ["/api/dashboard", "/api/appointments", "/api/pets", "/api/settings"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 401, "{}", path);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Not authenticated");
    }

    let response = app
        .client
        .get(app.url("/api/dashboard"))
        .header("Cookie", format!("{}=forged.token", app.config.sessions.cookie_name))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_check_auth_reflects_session() {
    let app = TestApp::new("test_check_auth_reflects_session").await;

    let body: Value = app
        .client
        .get(app.url("/api/check-auth"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["authenticated"], false);

    let user = register_and_login(&app).await;

    let body: Value = app
        .client
        .get(app.url("/api/check-auth"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["email"], user["email"]);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = TestApp::new("test_logout_revokes_session").await;
    let user = register_and_login(&app).await;
    assert_eq!(app.test_db().count_sessions(user_id(&user)).await, 1);

    let response = app.client.get(app.url("/api/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let response = app.client.post(app.url("/api/logout")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(app.test_db().count_sessions(user_id(&user)).await, 0);

    let response = app.client.get(app.url("/api/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = TestApp::new("test_logout_without_session").await;

    let response = app.client.post(app.url("/api/logout")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}
