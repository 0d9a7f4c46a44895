//! Health endpoint tests

use crate::common::TestApp;

#[tokio::test]
async fn test_health_returns_ok_json() {
    let app = TestApp::new("test_health_returns_ok_json").await;

    let response = app.client.get(app.url("/api/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("application/json"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_needs_no_session() {
    let app = TestApp::new("test_health_needs_no_session").await;

    let response = TestApp::new_client()
        .get(app.url("/api/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}
