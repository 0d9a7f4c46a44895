use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Veterinarian {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub contact: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A bookable clinic service. A vet offers it when `specialization == service_name`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClinicService {
    pub id: Uuid,
    pub service_name: String,
    pub fee: f64,
    pub description: String,
}

impl Veterinarian {
    pub fn offers(&self, service: &ClinicService) -> bool {
        self.specialization == service.service_name
    }
}
