use chrono::NaiveDate;
use qrcode::{QrCode, render::svg};
use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        pets::{DeletePetRequest, Pet, PetDetails, PetForm},
        users::UserSummary,
    },
    queries::pets,
    validation::{optional_text, parse_date, parse_uuid, validate_required_string},
};

const MAX_PET_FIELD_CHARS: usize = 100;

/// Validates a submitted pet form against `today`.
pub fn parse_pet_form(form: &PetForm, today: NaiveDate) -> Result<PetDetails> {
    let name = validate_required_string(form.name.as_deref(), "name", MAX_PET_FIELD_CHARS)?;
    let species = validate_required_string(form.species.as_deref(), "species", MAX_PET_FIELD_CHARS)?;
    let breed = validate_required_string(form.breed.as_deref(), "breed", MAX_PET_FIELD_CHARS)?;

    let birthdate = match optional_text(form.birthdate.as_deref()) {
        Some(raw) => {
            let birthdate = parse_date(&raw, "birthdate")?;
            if birthdate > today {
                return Err(Error::validation("birthdate", "Birthdate cannot be in the future"));
            }
            Some(birthdate)
        }
        None => None,
    };

    let vaccinated = match optional_text(form.vaccinated.as_deref()).as_deref() {
        None | Some("0") | Some("false") => false,
        Some("1") | Some("true") => true,
        Some(_) => return Err(Error::validation("vaccinated", "Invalid vaccinated value")),
    };

    Ok(PetDetails {
        name,
        species,
        breed,
        birthdate,
        vaccinated,
        medical_history: optional_text(form.medical_history.as_deref()),
    })
}

pub async fn list_pets(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Pet>> {
    pets::list_pets_by_user(conn, user_id).await
}

pub async fn add_pet(conn: &mut DbConn, user_id: Uuid, form: PetForm, today: NaiveDate) -> Result<Pet> {
    let details = parse_pet_form(&form, today)?;
    let pet = pets::create_pet(conn, user_id, &details).await?;

    tracing::info!(pet_id = %pet.id, user_id = %user_id, "Pet added");
    Ok(pet)
}

pub async fn update_pet(conn: &mut DbConn, user_id: Uuid, form: PetForm, today: NaiveDate) -> Result<Pet> {
    let pet_id = parse_uuid(form.id.as_deref().unwrap_or_default(), "id")?;
    let details = parse_pet_form(&form, today)?;

    pets::update_pet(conn, pet_id, user_id, &details)
        .await?
        .ok_or_else(|| Error::NotFound("Pet not found".to_string()))
}

/// Deletes an owned pet. Pets with appointments are kept.
pub async fn delete_pet(conn: &mut DbConn, user_id: Uuid, request: DeletePetRequest) -> Result<()> {
    let raw_id = request
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::validation("id", "Pet ID is required"))?;
    let not_found = || Error::NotFound("Pet not found".to_string());
    let pet_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;

    if pets::delete_pet(conn, pet_id, user_id).await? == 0 {
        return Err(not_found());
    }

    tracing::info!(pet_id = %pet_id, user_id = %user_id, "Pet deleted");
    Ok(())
}

pub async fn get_pet(conn: &mut DbConn, user_id: Uuid, pet_id: Uuid) -> Result<Pet> {
    pets::get_pet_for_user(conn, pet_id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Pet not found".to_string()))
}

/// Plain-text card encoded in the pet's QR tag.
pub fn pet_card_text(pet: &Pet, owner: &UserSummary) -> String {
    let birthdate = pet
        .birthdate
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    format!(
        "Pet: {}\nSpecies: {}\nBreed: {}\nBirthdate: {}\nVaccinated: {}\nOwner: {}\nContact: {}",
        pet.name,
        pet.species,
        pet.breed,
        birthdate,
        if pet.vaccinated { "Yes" } else { "No" },
        owner.name,
        owner.email,
    )
}

/// Renders the pet card as an SVG QR code.
pub fn render_pet_qr_svg(pet: &Pet, owner: &UserSummary) -> Result<String> {
    let code = QrCode::new(pet_card_text(pet, owner).as_bytes())
        .map_err(|e| Error::Internal(format!("Failed to encode QR code: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Download filename for a pet's QR tag; keeps the name header-safe.
pub fn qr_download_filename(pet: &Pet) -> String {
    let slug: String = pet
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("pet-{}-qr.svg", slug)
}
