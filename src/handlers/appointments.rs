use axum::{
    Json,
    extract::{Extension, Query, State},
};
use serde_json::json;

use crate::{
    error::Result,
    handlers::JsonBody,
    middleware::auth::AuthenticatedUser,
    models::appointments::{BookAppointmentRequest, BookedSlotsQuery, CancelAppointmentRequest, SlotAvailability},
    services::{
        appointments::{self, clinic_now},
        clinic, pets,
    },
    state::AppState,
};

/// GET /api/appointments
///
/// Everything the appointments page needs: upcoming and past appointments,
/// plus the pets, veterinarians and services for the booking form.
pub async fn index(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let today = clinic_now().date();

    let listing = appointments::list_appointments(&mut conn, user.id, today).await?;
    let pets = pets::list_pets(&mut conn, user.id).await?;
    let veterinarians = clinic::list_bookable_veterinarians(&mut conn).await?;
    let services = clinic::list_services(&mut conn).await?;

    Ok(Json(json!({
        "success": true,
        "upcomingAppointments": listing.upcoming,
        "allAppointments": listing.history,
        "pets": pets,
        "veterinarians": veterinarians,
        "services": services,
    })))
}

/// POST /api/appointments/book
///
/// # HTTP Status Codes
/// - `200 OK`: Booked with status `Pending`
/// - `400 BAD_REQUEST`: Missing field, past slot, off-interval or outside hours
/// - `404 NOT_FOUND`: Unknown pet, veterinarian or service
/// - `409 CONFLICT`: Slot already booked
pub async fn book(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<BookAppointmentRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let appointment = appointments::book_appointment(&mut conn, user.id, request, clinic_now()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "appointment": appointment,
    })))
}

/// POST /api/appointments/cancel
pub async fn cancel(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CancelAppointmentRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    appointments::cancel_appointment(&mut conn, user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully",
    })))
}

/// GET /api/appointments/getBookedSlots?date=YYYY-MM-DD&vet_id=<uuid>
///
/// Returns empty lists when either parameter is missing.
pub async fn booked_slots(
    State(state): State<AppState>,
    Query(query): Query<BookedSlotsQuery>,
) -> Result<Json<SlotAvailability>> {
    let mut conn = state.pool.acquire().await?;
    let availability = appointments::get_slot_availability(&mut conn, &query, clinic_now()).await?;

    Ok(Json(availability))
}
