use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::pets::{Pet, PetDetails},
};

use crate::DbConn;

const PET_COLUMNS: &str = r#"
    id, user_id, name, species, breed, birthdate, vaccinated,
    medical_history, photo, created_at, updated_at
"#;

/// Inserts a pet owned by `user_id`.
pub async fn create_pet(conn: &mut DbConn, user_id: Uuid, details: &PetDetails) -> Result<Pet> {
    let sql = format!(
        r#"
        INSERT INTO pets (user_id, name, species, breed, birthdate, vaccinated, medical_history)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {PET_COLUMNS}
        "#
    );

    let pet = sqlx::query_as::<_, Pet>(&sql)
        .bind(user_id)
        .bind(&details.name)
        .bind(&details.species)
        .bind(&details.breed)
        .bind(details.birthdate)
        .bind(details.vaccinated)
        .bind(&details.medical_history)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(pet)
}

/// Lists a user's pets by name.
pub async fn list_pets_by_user(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Pet>> {
    let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE user_id = $1 ORDER BY name ASC, created_at ASC");
    let pets = sqlx::query_as::<_, Pet>(&sql)
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(pets)
}

/// Gets a pet only if it belongs to `user_id`.
pub async fn get_pet_for_user(conn: &mut DbConn, pet_id: Uuid, user_id: Uuid) -> Result<Option<Pet>> {
    let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1 AND user_id = $2");
    let pet = sqlx::query_as::<_, Pet>(&sql)
        .bind(pet_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(pet)
}

/// Updates a pet scoped by owner. Returns `None` when no owned pet matched.
pub async fn update_pet(
    conn: &mut DbConn,
    pet_id: Uuid,
    user_id: Uuid,
    details: &PetDetails,
) -> Result<Option<Pet>> {
    let sql = format!(
        r#"
        UPDATE pets
        SET name = $1, species = $2, breed = $3, birthdate = $4,
            vaccinated = $5, medical_history = $6, updated_at = now()
        WHERE id = $7 AND user_id = $8
        RETURNING {PET_COLUMNS}
        "#
    );

    let pet = sqlx::query_as::<_, Pet>(&sql)
        .bind(&details.name)
        .bind(&details.species)
        .bind(&details.breed)
        .bind(details.birthdate)
        .bind(details.vaccinated)
        .bind(&details.medical_history)
        .bind(pet_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(pet)
}

/// Deletes a pet scoped by owner.
///
/// A pet still referenced by appointments trips the foreign key and is
/// reported as a conflict.
pub async fn delete_pet(conn: &mut DbConn, pet_id: Uuid, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM pets
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(pet_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(|e| {
        let is_fk_violation = e
            .as_database_error()
            .map(|db| db.is_foreign_key_violation())
            .unwrap_or(false);
        if is_fk_violation {
            Error::Conflict("Pet has appointments and cannot be deleted".to_string())
        } else {
            Error::Sqlx(e)
        }
    })?
    .rows_affected();

    Ok(rows_affected)
}

/// Counts a user's pets.
pub async fn count_pets_by_user(conn: &mut DbConn, user_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pets WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(count)
}
