use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::appointments::{Appointment, AppointmentStatus, AppointmentView, NewAppointment},
};

use crate::DbConn;

const APPOINTMENT_COLUMNS: &str = r#"
    id, user_id, pet_id, vet_id, service_id, appointment_date, appointment_time,
    status, remarks, created_at
"#;

const VIEW_SELECT: &str = r#"
    SELECT a.id, a.appointment_date, a.appointment_time, a.status, a.remarks,
           p.name AS pet_name, v.name AS vet_name, s.service_name AS service_name
    FROM appointments a
    JOIN veterinarians v ON v.id = a.vet_id
    JOIN services s ON s.id = a.service_id
    JOIN pets p ON p.id = a.pet_id
"#;

/// Returns the id of a live (non-cancelled) appointment in this vet slot, if any.
pub async fn find_active_at_slot(
    conn: &mut DbConn,
    vet_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM appointments
        WHERE vet_id = $1
          AND appointment_date = $2
          AND appointment_time = $3
          AND status <> $4
        LIMIT 1
        "#,
    )
    .bind(vet_id)
    .bind(date)
    .bind(time)
    .bind(AppointmentStatus::Cancelled)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(id)
}

/// Inserts a `Pending` appointment unless the vet slot is already live.
///
/// Backed by the partial unique index `appointments_vet_slot_active_key`, so two
/// concurrent requests for one slot can never both succeed. `None` means the
/// slot was taken.
pub async fn insert_if_slot_free(conn: &mut DbConn, new: &NewAppointment) -> Result<Option<Appointment>> {
    let sql = format!(
        r#"
        INSERT INTO appointments
            (user_id, pet_id, vet_id, service_id, appointment_date, appointment_time, status, remarks)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (vet_id, appointment_date, appointment_time)
            WHERE status <> 'Cancelled'
            DO NOTHING
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    );

    let appointment = sqlx::query_as::<_, Appointment>(&sql)
        .bind(new.user_id)
        .bind(new.pet_id)
        .bind(new.vet_id)
        .bind(new.service_id)
        .bind(new.appointment_date)
        .bind(new.appointment_time)
        .bind(AppointmentStatus::Pending)
        .bind(&new.remarks)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(appointment)
}

/// Gets an appointment only if it belongs to `user_id`.
pub async fn get_appointment_for_user(
    conn: &mut DbConn,
    appointment_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Appointment>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 AND user_id = $2");
    let appointment = sqlx::query_as::<_, Appointment>(&sql)
        .bind(appointment_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(appointment)
}

/// Moves an owned, not yet cancelled appointment to `Cancelled`.
pub async fn mark_cancelled(conn: &mut DbConn, appointment_id: Uuid, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE appointments
        SET status = $1
        WHERE id = $2 AND user_id = $3 AND status <> $1
        "#,
    )
    .bind(AppointmentStatus::Cancelled)
    .bind(appointment_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Distinct live booking times for one vet on one day, ascending.
pub async fn booked_times(conn: &mut DbConn, vet_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>> {
    let times = sqlx::query_scalar::<_, NaiveTime>(
        r#"
        SELECT DISTINCT appointment_time
        FROM appointments
        WHERE vet_id = $1 AND appointment_date = $2 AND status <> $3
        ORDER BY appointment_time ASC
        "#,
    )
    .bind(vet_id)
    .bind(date)
    .bind(AppointmentStatus::Cancelled)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(times)
}

/// Live appointments on or after `today`, soonest first.
pub async fn list_upcoming(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<Vec<AppointmentView>> {
    let sql = format!(
        r#"
        {VIEW_SELECT}
        WHERE a.user_id = $1 AND a.status <> $2 AND a.appointment_date >= $3
        ORDER BY a.appointment_date ASC, a.appointment_time ASC
        "#
    );

    let rows = sqlx::query_as::<_, AppointmentView>(&sql)
        .bind(user_id)
        .bind(AppointmentStatus::Cancelled)
        .bind(today)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// Cancelled or past appointments, most recent first.
pub async fn list_history(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<Vec<AppointmentView>> {
    let sql = format!(
        r#"
        {VIEW_SELECT}
        WHERE a.user_id = $1 AND (a.status = $2 OR a.appointment_date < $3)
        ORDER BY a.appointment_date DESC, a.appointment_time DESC
        "#
    );

    let rows = sqlx::query_as::<_, AppointmentView>(&sql)
        .bind(user_id)
        .bind(AppointmentStatus::Cancelled)
        .bind(today)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// Counts live appointments on or after `today`.
pub async fn count_upcoming(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM appointments
        WHERE user_id = $1 AND status <> $2 AND appointment_date >= $3
        "#,
    )
    .bind(user_id)
    .bind(AppointmentStatus::Cancelled)
    .bind(today)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}

/// Counts non-cancelled appointments dated before `today`.
pub async fn count_past_visits(conn: &mut DbConn, user_id: Uuid, today: NaiveDate) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM appointments
        WHERE user_id = $1 AND status <> $2 AND appointment_date < $3
        "#,
    )
    .bind(user_id)
    .bind(AppointmentStatus::Cancelled)
    .bind(today)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}
