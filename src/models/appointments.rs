use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

/// Appointment lifecycle status. Stored and sent on the wire as the variant name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type,
)]
#[sqlx(type_name = "text")]
pub enum AppointmentStatus {
    /// Newly booked, awaiting clinic confirmation
    Pending,
    /// Accepted by clinic staff
    Confirmed,
    /// Cancelled by the owner; frees the slot
    Cancelled,
    /// Visit took place
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub vet_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing row joined with pet, vet and service names.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppointmentView {
    pub id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub remarks: Option<String>,
    pub pet_name: String,
    pub vet_name: String,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub vet_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub remarks: Option<String>,
}

/// Booking form as posted by the frontend.
///
/// Fields stay textual until the booking service parses them, so a missing or
/// malformed value is reported against its field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub pet_id: Option<String>,
    pub veterinarian_id: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub remarks: Option<String>,
}

/// A booking request after parsing, before any business rule is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSlotRequest {
    pub pet_id: Uuid,
    pub vet_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookedSlotsQuery {
    pub date: Option<String>,
    pub vet_id: Option<String>,
}

/// Booked and still-open slots for one vet on one day, as `HH:MM` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub booked_slots: Vec<String>,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_pets: i64,
    pub upcoming_appointments: i64,
    pub completed_visits: i64,
    pub appointments: Vec<AppointmentView>,
}

/// A user's appointments split into what is still ahead and what is done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListing {
    pub upcoming: Vec<AppointmentView>,
    pub history: Vec<AppointmentView>,
}
