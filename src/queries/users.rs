use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::{NewUser, User},
};

use crate::DbConn;

const USER_COLUMNS: &str = r#"
    id, name, username, email, password_hash, verification_code,
    verification_code_expires_at, is_verified, created_at, updated_at
"#;

/// Creates a new, unverified user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let sql = format!(
        r#"
        INSERT INTO users (name, username, email, password_hash, verification_code, verification_code_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&new_user.name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.verification_code)
        .bind(new_user.verification_code_expires_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let error_msg = e.to_string().to_lowercase();

            // Unique constraint violations (raced past the service pre-checks)
            if error_msg.contains("users_username_key") {
                Error::Conflict("Username already taken".to_string())
            } else if error_msg.contains("users_email_key")
                || error_msg.contains("duplicate key")
            {
                Error::Conflict("Email already registered".to_string())
            } else {
                Error::Sqlx(e)
            }
        })?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their email address. The user may not exist.
pub async fn get_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their username. The user may not exist.
pub async fn get_user_by_username(conn: &mut DbConn, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Replaces the pending verification code of an unverified user.
pub async fn update_verification_code(
    conn: &mut DbConn,
    user_id: Uuid,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE users
        SET verification_code = $1, verification_code_expires_at = $2, updated_at = now()
        WHERE id = $3 AND is_verified = FALSE
        "#,
    )
    .bind(code)
    .bind(expires_at)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound("User not found".to_string()));
    }

    Ok(())
}

/// Marks the user verified if `code` matches and has not expired.
///
/// Returns `true` when a row was updated. The code is cleared on success so it
/// cannot be replayed.
pub async fn verify_user(conn: &mut DbConn, email: &str, code: &str) -> Result<bool> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE users
        SET is_verified = TRUE,
            verification_code = NULL,
            verification_code_expires_at = NULL,
            updated_at = now()
        WHERE email = $1
          AND is_verified = FALSE
          AND verification_code = $2
          AND verification_code_expires_at > now()
        "#,
    )
    .bind(email)
    .bind(code)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Updates a user's display name and email.
pub async fn update_profile(conn: &mut DbConn, user_id: Uuid, name: &str, email: &str) -> Result<User> {
    let sql = format!(
        r#"
        UPDATE users
        SET name = $1, email = $2, updated_at = now()
        WHERE id = $3
        RETURNING {USER_COLUMNS}
        "#
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(name)
        .bind(email)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            if e.to_string().to_lowercase().contains("users_email_key") {
                Error::Conflict("Email already in use".to_string())
            } else {
                Error::Sqlx(e)
            }
        })?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Updates a user's password hash.
pub async fn update_user_password(conn: &mut DbConn, user_id: Uuid, password_hash: &str) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, updated_at = now()
        WHERE id = $2
        "#,
    )
    .bind(password_hash)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("User with ID {} not found", user_id)));
    }

    Ok(())
}

/// Deletes a user by their ID. Pets, sessions and appointments cascade.
pub async fn delete_user(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
