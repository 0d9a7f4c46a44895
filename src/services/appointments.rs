use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::appointments::{
        Appointment, AppointmentListing, AppointmentStatus, BookAppointmentRequest, BookedSlotsQuery,
        BookingSlotRequest, CancelAppointmentRequest, DashboardSummary, NewAppointment, SlotAvailability,
    },
    queries::{appointments, clinic, pets},
    validation::{optional_text, parse_date, parse_uuid},
};

/// First bookable slot of the day.
pub const FIRST_SLOT_MINUTES: u32 = 8 * 60;
/// Last bookable slot of the day (17:30).
pub const LAST_SLOT_MINUTES: u32 = 17 * 60 + 30;
pub const SLOT_STEP_MINUTES: u32 = 30;

const DASHBOARD_PREVIEW_LIMIT: usize = 5;

/// Wall-clock time at the clinic. Dates and times are stored without a zone.
pub fn clinic_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Every bookable slot of a clinic day, ascending.
pub fn clinic_slots() -> Vec<NaiveTime> {
    (FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES)
        .step_by(SLOT_STEP_MINUTES as usize)
        .filter_map(|minutes| NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0))
        .collect()
}

/// Wire form of a slot: "HH:MM".
pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Accepts "HH:MM" or "HH:MM:SS".
fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| Error::validation("time", "Invalid time format, expected HH:MM"))
}

fn required<'a>(value: &'a Option<String>, field: &str, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(field, message))
}

/// Turns the raw request body into typed values, naming the first bad field.
pub fn parse_booking_request(request: &BookAppointmentRequest) -> Result<BookingSlotRequest> {
    let pet_id = parse_uuid(required(&request.pet_id, "pet_id", "Pet is required")?, "pet_id")?;
    let vet_id = parse_uuid(
        required(&request.veterinarian_id, "veterinarian_id", "Veterinarian is required")?,
        "veterinarian_id",
    )?;
    let service_id = parse_uuid(required(&request.service, "service", "Service is required")?, "service")?;
    let date = parse_date(required(&request.date, "date", "Date is required")?, "date")?;
    let time = parse_time(required(&request.time, "time", "Time is required")?)?;

    Ok(BookingSlotRequest {
        pet_id,
        vet_id,
        service_id,
        date,
        time,
        remarks: optional_text(request.remarks.as_deref()),
    })
}

/// Checks that a slot is in the future, on the half hour, and within clinic hours.
pub fn validate_booking_slot(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Result<()> {
    if date.and_time(time) < now {
        return Err(Error::validation("date", "Cannot book appointments in the past"));
    }

    if (time.minute() != 0 && time.minute() != 30) || time.second() != 0 || time.nanosecond() != 0 {
        return Err(Error::validation(
            "time",
            "Appointments must be booked in 30-minute intervals",
        ));
    }

    let minutes = time.hour() * 60 + time.minute();
    if !(FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES).contains(&minutes) {
        return Err(Error::validation(
            "time",
            "Appointments must be between 08:00 and 17:30",
        ));
    }

    Ok(())
}

fn slot_taken() -> Error {
    Error::Conflict("This time slot is already booked".to_string())
}

/// Live booked times for a vet on a day, as sorted distinct "HH:MM" strings.
///
/// Missing or unparsable parameters yield an empty list rather than an error.
pub async fn get_booked_slots(conn: &mut DbConn, query: &BookedSlotsQuery) -> Result<Vec<String>> {
    let Some((vet_id, date)) = parse_slot_query(query) else {
        return Ok(Vec::new());
    };

    let mut slots: Vec<String> = appointments::booked_times(conn, vet_id, date)
        .await?
        .into_iter()
        .map(format_slot)
        .collect();
    slots.sort();
    slots.dedup();

    Ok(slots)
}

fn parse_slot_query(query: &BookedSlotsQuery) -> Option<(Uuid, NaiveDate)> {
    let vet_id = Uuid::parse_str(query.vet_id.as_deref()?.trim()).ok()?;
    let date = NaiveDate::parse_from_str(query.date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
    Some((vet_id, date))
}

/// Slots still open for booking given what is taken and the current time.
pub fn open_slots(date: NaiveDate, booked: &[String], now: NaiveDateTime) -> Vec<String> {
    clinic_slots()
        .into_iter()
        .filter(|slot| date.and_time(*slot) >= now)
        .map(format_slot)
        .filter(|slot| !booked.contains(slot))
        .collect()
}

/// Booked and open slots for the availability endpoint.
pub async fn get_slot_availability(
    conn: &mut DbConn,
    query: &BookedSlotsQuery,
    now: NaiveDateTime,
) -> Result<SlotAvailability> {
    let Some((_, date)) = parse_slot_query(query) else {
        return Ok(SlotAvailability::default());
    };

    let booked_slots = get_booked_slots(conn, query).await?;
    let available_slots = open_slots(date, &booked_slots, now);

    Ok(SlotAvailability {
        booked_slots,
        available_slots,
    })
}

/// Validates and books an appointment for `user_id`
///
/// The slot pre-check gives the common case a clean error; the conditional
/// insert settles a race between two requests for the same slot.
pub async fn book_appointment(
    conn: &mut DbConn,
    user_id: Uuid,
    request: BookAppointmentRequest,
    now: NaiveDateTime,
) -> Result<Appointment> {
    let slot = parse_booking_request(&request)?;
    validate_booking_slot(slot.date, slot.time, now)?;

    if appointments::find_active_at_slot(conn, slot.vet_id, slot.date, slot.time)
        .await?
        .is_some()
    {
        return Err(slot_taken());
    }

    pets::get_pet_for_user(conn, slot.pet_id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Pet not found".to_string()))?;

    let vet = clinic::get_veterinarian_by_id(conn, slot.vet_id)
        .await?
        .filter(|vet| vet.is_active)
        .ok_or_else(|| Error::NotFound("Veterinarian not found".to_string()))?;

    let service = clinic::get_service_by_id(conn, slot.service_id)
        .await?
        .ok_or_else(|| Error::NotFound("Service not found".to_string()))?;

    if !vet.offers(&service) {
        return Err(Error::validation(
            "veterinarian_id",
            "Veterinarian does not offer this service",
        ));
    }

    let new_appointment = NewAppointment {
        user_id,
        pet_id: slot.pet_id,
        vet_id: slot.vet_id,
        service_id: slot.service_id,
        appointment_date: slot.date,
        appointment_time: slot.time,
        remarks: slot.remarks,
    };

    let Some(appointment) = appointments::insert_if_slot_free(conn, &new_appointment).await? else {
        tracing::warn!(
            vet_id = %slot.vet_id,
            date = %slot.date,
            time = %slot.time,
            "Slot taken between check and insert"
        );
        return Err(slot_taken());
    };

    tracing::info!(
        appointment_id = %appointment.id,
        user_id = %user_id,
        vet_id = %appointment.vet_id,
        status = %appointment.status,
        "Appointment booked"
    );
    Ok(appointment)
}

/// Cancels one of the user's own appointments
pub async fn cancel_appointment(
    conn: &mut DbConn,
    user_id: Uuid,
    request: CancelAppointmentRequest,
) -> Result<()> {
    let raw_id = required(&request.id, "id", "Appointment ID is required")?;
    // A malformed id cannot match any row
    let not_found = || Error::NotFound("Appointment not found".to_string());
    let appointment_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;

    let appointment = appointments::get_appointment_for_user(conn, appointment_id, user_id)
        .await?
        .ok_or_else(not_found)?;

    if appointment.status == AppointmentStatus::Cancelled {
        return Err(already_cancelled());
    }

    if appointments::mark_cancelled(conn, appointment_id, user_id).await? == 0 {
        return Err(already_cancelled());
    }

    tracing::info!(
        appointment_id = %appointment_id,
        user_id = %user_id,
        previous_status = %appointment.status,
        "Appointment cancelled"
    );
    Ok(())
}

fn already_cancelled() -> Error {
    Error::validation("id", "Appointment already cancelled")
}

pub async fn list_appointments(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<AppointmentListing> {
    let upcoming = appointments::list_upcoming(&mut *conn, user_id, today).await?;
    let history = appointments::list_history(&mut *conn, user_id, today).await?;

    Ok(AppointmentListing { upcoming, history })
}

pub async fn get_dashboard_summary(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<DashboardSummary> {
    let total_pets = pets::count_pets_by_user(&mut *conn, user_id).await?;
    let upcoming_appointments = appointments::count_upcoming(&mut *conn, user_id, today).await?;
    let completed_visits = appointments::count_past_visits(&mut *conn, user_id, today).await?;

    let mut preview = appointments::list_upcoming(&mut *conn, user_id, today).await?;
    preview.truncate(DASHBOARD_PREVIEW_LIMIT);

    Ok(DashboardSummary {
        total_pets,
        upcoming_appointments,
        completed_visits,
        appointments: preview,
    })
}
