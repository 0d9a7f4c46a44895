use crate::{
    error::{Error, Result},
    models::users::{NewUserSession, UserSession},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::DbConn;

/// Hash a session token using SHA-256 for secure storage
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Creates a new user session in the database.
pub async fn create_session(conn: &mut DbConn, new_session: NewUserSession) -> Result<UserSession> {
    let session = sqlx::query_as::<_, UserSession>(
        r#"
        INSERT INTO user_sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, token_hash, expires_at, created_at, updated_at
        "#,
    )
    .bind(new_session.user_id)
    .bind(&new_session.token_hash)
    .bind(new_session.expires_at)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Gets a valid session (exists and not expired) by its token hash.
pub async fn get_valid_session_by_token_hash(conn: &mut DbConn, token_hash: &str) -> Result<Option<UserSession>> {
    let session = sqlx::query_as::<_, UserSession>(
        r#"
        SELECT id, user_id, token_hash, expires_at, created_at, updated_at
        FROM user_sessions
        WHERE token_hash = $1 AND expires_at > NOW()
        "#,
    )
    .bind(token_hash)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Deletes a session by its token hash.
pub async fn delete_session_by_token_hash(conn: &mut DbConn, token_hash: &str) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM user_sessions
        WHERE token_hash = $1
        "#,
    )
    .bind(token_hash)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Deletes every session of a user except the one identified by `keep_token_hash`.
pub async fn delete_other_sessions(conn: &mut DbConn, user_id: Uuid, keep_token_hash: &str) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM user_sessions
        WHERE user_id = $1 AND token_hash <> $2
        "#,
    )
    .bind(user_id)
    .bind(keep_token_hash)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Deletes all expired sessions.
pub async fn delete_expired_sessions(conn: &mut DbConn) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM user_sessions
        WHERE expires_at < NOW()
        "#,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
