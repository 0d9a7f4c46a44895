use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::clinic::{ClinicService, Veterinarian},
};

use crate::DbConn;

/// Lists every veterinarian, active ones first.
pub async fn list_veterinarians(conn: &mut DbConn) -> Result<Vec<Veterinarian>> {
    let vets = sqlx::query_as::<_, Veterinarian>(
        r#"
        SELECT id, name, specialization, contact, is_active, created_at
        FROM veterinarians
        ORDER BY is_active DESC, name ASC
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(vets)
}

/// Lists veterinarians that can currently be booked.
pub async fn list_active_veterinarians(conn: &mut DbConn) -> Result<Vec<Veterinarian>> {
    let vets = sqlx::query_as::<_, Veterinarian>(
        r#"
        SELECT id, name, specialization, contact, is_active, created_at
        FROM veterinarians
        WHERE is_active = TRUE
        ORDER BY name ASC
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(vets)
}

pub async fn get_veterinarian_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Veterinarian>> {
    let vet = sqlx::query_as::<_, Veterinarian>(
        r#"
        SELECT id, name, specialization, contact, is_active, created_at
        FROM veterinarians
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(vet)
}

pub async fn list_services(conn: &mut DbConn) -> Result<Vec<ClinicService>> {
    let services = sqlx::query_as::<_, ClinicService>(
        r#"
        SELECT id, service_name, fee, description
        FROM services
        ORDER BY service_name ASC
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(services)
}

pub async fn get_service_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<ClinicService>> {
    let service = sqlx::query_as::<_, ClinicService>(
        r#"
        SELECT id, service_name, fee, description
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(service)
}
