use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::{
        pets::{DeletePetRequest, PetForm},
        users::UserSummary,
    },
    services::{appointments::clinic_now, pets},
    state::AppState,
};

/// Collects the text fields of a pet form. File parts such as `photo` are skipped.
async fn read_pet_form(mut multipart: Multipart) -> Result<PetForm> {
    let mut form = PetForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation("form", format!("Invalid form data: {}", e)))?
    {
        if field.file_name().is_some() {
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "id" => &mut form.id,
            "name" => &mut form.name,
            "species" => &mut form.species,
            "breed" => &mut form.breed,
            "birthdate" => &mut form.birthdate,
            "vaccinated" => &mut form.vaccinated,
            "medical_history" => &mut form.medical_history,
            _ => continue,
        };

        let value = field
            .text()
            .await
            .map_err(|e| Error::validation(&name, format!("Invalid form data: {}", e)))?;
        *slot = Some(value);
    }

    Ok(form)
}

/// GET /api/pets
pub async fn list_pets(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let pets = pets::list_pets(&mut conn, user.id).await?;

    Ok(Json(json!({ "success": true, "pets": pets })))
}

/// POST /api/pets/add (multipart/form-data)
pub async fn add_pet(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let form = read_pet_form(multipart).await?;

    let mut conn = state.pool.acquire().await?;
    let pet = pets::add_pet(&mut conn, user.id, form, clinic_now().date()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Pet added successfully",
        "pet": pet,
    })))
}

/// POST /api/pets/update (multipart/form-data, `id` required)
pub async fn update_pet(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let form = read_pet_form(multipart).await?;

    let mut conn = state.pool.acquire().await?;
    let pet = pets::update_pet(&mut conn, user.id, form, clinic_now().date()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Pet updated successfully",
        "pet": pet,
    })))
}

/// POST /api/pets/delete
pub async fn delete_pet(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DeletePetRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    pets::delete_pet(&mut conn, user.id, request).await?;

    Ok(Json(json!({ "success": true, "message": "Pet deleted successfully" })))
}

async fn render_qr(state: &AppState, user: &AuthenticatedUser, pet_id: Uuid) -> Result<(String, String)> {
    let mut conn = state.pool.acquire().await?;
    let pet = pets::get_pet(&mut conn, user.id, pet_id).await?;

    let svg = pets::render_pet_qr_svg(&pet, &UserSummary::from(user))?;
    Ok((svg, pets::qr_download_filename(&pet)))
}

/// GET /api/pets/qr/{id}
pub async fn pet_qr(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
) -> Result<Response> {
    let (svg, _) = render_qr(&state, &user, pet_id).await?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

/// GET /api/pets/download-qr/{id}
pub async fn download_pet_qr(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
) -> Result<Response> {
    let (svg, filename) = render_qr(&state, &user, pet_id).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| Error::Internal(format!("Invalid download filename: {}", e)))?;

    let mut response = ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response();
    response.headers_mut().insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
