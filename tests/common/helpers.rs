//! Shared test helper functions
//!
//! Utilities used across several test binaries.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use vetportal::{Mailer, Result};

use crate::common::TestApp;

/// Mailer that remembers every code it was asked to send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Registers, verifies and logs in a user over HTTP
///
/// The session cookie lands in `app.client`'s cookie store.
///
/// # Returns
/// The `user` object from the login response
pub async fn register_and_login(app: &TestApp) -> Value {
    let register = app.db.generate_test_user();

    let response = app
        .client
        .post(app.url("/api/register"))
        .json(&serde_json::json!({
            "name": register.name,
            "username": register.username,
            "email": register.email,
            "password": register.password,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let code = app
        .test_db()
        .verification_code(&register.email)
        .await
        .expect("Registration should store a verification code");

    let response = app
        .client
        .post(app.url("/api/verify"))
        .json(&serde_json::json!({ "email": register.email, "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .post(app.url("/api/login"))
        .json(&serde_json::json!({ "email": register.email, "password": register.password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    body["user"].clone()
}

/// Parses a user id out of a JSON user object
pub fn user_id(user: &Value) -> uuid::Uuid {
    user["id"].as_str().unwrap().parse().unwrap()
}
