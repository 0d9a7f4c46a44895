use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birthdate: Option<NaiveDate>,
    pub vaccinated: bool,
    pub medical_history: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated pet fields, shared by insert and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetDetails {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birthdate: Option<NaiveDate>,
    pub vaccinated: bool,
    pub medical_history: Option<String>,
}

/// Raw form submission as received from the multipart body.
///
/// Everything is kept as text so validation can report which field is wrong.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub birthdate: Option<String>,
    pub vaccinated: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePetRequest {
    pub id: Option<String>,
}
