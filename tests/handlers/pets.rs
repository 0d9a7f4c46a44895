//! Pet endpoints over HTTP, including the multipart forms and QR tags

use crate::common::{TestApp, register_and_login, user_id};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

fn pet_form(name: &str, vaccinated: bool) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("species", "Dog")
        .text("breed", "Shih Tzu")
        .text("birthdate", "2020-02-29")
        .text("vaccinated", if vaccinated { "1" } else { "0" })
        .text("medical_history", "Skin allergy")
}

#[tokio::test]
async fn test_add_update_delete_pet_over_http() {
    let app = TestApp::new("test_add_update_delete_pet_over_http").await;
    register_and_login(&app).await;

    let form = pet_form("Yuki", true).part(
        "photo",
        Part::bytes(vec![0x89, 0x50, 0x4e, 0x47]).file_name("yuki.png"),
    );
    let response = app
        .client
        .post(app.url("/api/pets/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Pet added successfully");
    assert_eq!(body["pet"]["name"], "Yuki");
    assert_eq!(body["pet"]["vaccinated"], true);
    let pet_id = body["pet"]["id"].as_str().unwrap().to_string();

    let form = pet_form("Yuki Chan", false).text("id", pet_id.clone());
    let response = app
        .client
        .post(app.url("/api/pets/update"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pet"]["name"], "Yuki Chan");
    assert_eq!(body["pet"]["vaccinated"], false);

    let body: Value = app
        .client
        .get(app.url("/api/pets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pets"].as_array().unwrap().len(), 1);

    let response = app
        .client
        .post(app.url("/api/pets/delete"))
        .json(&json!({ "id": pet_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = app
        .client
        .get(app.url("/api/pets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["pets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_pet_missing_name_returns_400() {
    let app = TestApp::new("test_add_pet_missing_name_returns_400").await;
    register_and_login(&app).await;

    let form = Form::new().text("species", "Cat").text("breed", "Persian");
    let response = app
        .client
        .post(app.url("/api/pets/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["name"].is_string());
}

#[tokio::test]
async fn test_pet_qr_endpoints() {
    let app = TestApp::new("test_pet_qr_endpoints").await;
    let user = register_and_login(&app).await;
    let pet = app.db.create_pet(user_id(&user), "Mr. Whiskers").await;

    let response = app
        .client
        .get(app.url(&format!("/api/pets/qr/{}", pet.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    let svg = response.text().await.unwrap();
    assert!(svg.contains("<svg"));

    let response = app
        .client
        .get(app.url(&format!("/api/pets/download-qr/{}", pet.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"pet-Mr__Whiskers-qr.svg\""
    );
}

#[tokio::test]
async fn test_pet_qr_of_other_owner_returns_404() {
    let app = TestApp::new("test_pet_qr_of_other_owner_404").await;
    register_and_login(&app).await;
    let stranger = app.db.create_user(true).await;
    let pet = app.db.create_pet(stranger.id, "Secret").await;

    let response = app
        .client
        .get(app.url(&format!("/api/pets/qr/{}", pet.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_delete_pet_with_malformed_id_returns_404() {
    let app = TestApp::new("test_delete_pet_malformed_id_404").await;
    register_and_login(&app).await;

    let response = app
        .client
        .post(app.url("/api/pets/delete"))
        .json(&json!({ "id": "abc" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Pet not found");
}
