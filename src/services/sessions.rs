use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    config::SessionConfig,
    error::{Error, Result},
    models::users::{NewUserSession, User, UserSession},
    queries::{sessions, users},
    services::session_tokens::{generate_session_token, verify_session_token},
};

/// Creates a session for `user_id` and returns the signed token with its row.
pub async fn start_session(
    conn: &mut DbConn,
    user_id: Uuid,
    config: &SessionConfig,
) -> Result<(String, UserSession)> {
    let token = generate_session_token(config.secret.expose_secret())?;

    let session = sessions::create_session(
        conn,
        NewUserSession {
            user_id,
            token_hash: sessions::hash_session_token(&token),
            expires_at: Utc::now() + Duration::hours(config.ttl_hours),
        },
    )
    .await?;

    Ok((token, session))
}

/// Resolves a presented session token to its user.
///
/// The signature is checked before any lookup, so forged cookies never reach
/// the database.
pub async fn authenticate_session(
    conn: &mut DbConn,
    session_token: &str,
    config: &SessionConfig,
) -> Result<(User, UserSession)> {
    let session_token = session_token.trim();
    if session_token.is_empty() {
        return Err(Error::Authentication("Not authenticated".to_string()));
    }

    verify_session_token(session_token, config.secret.expose_secret())?;

    let token_hash = sessions::hash_session_token(session_token);
    let session = sessions::get_valid_session_by_token_hash(conn, &token_hash)
        .await?
        .ok_or_else(|| Error::SessionExpired("Session expired or revoked".to_string()))?;

    let user = users::get_user_by_id(conn, session.user_id)
        .await?
        .ok_or_else(|| Error::Authentication("Not authenticated".to_string()))?;

    Ok((user, session))
}

/// Revokes a specific session by its token. Unknown tokens are a no-op.
pub async fn revoke_session_by_token(conn: &mut DbConn, session_token: &str) -> Result<u64> {
    let session_token = session_token.trim();
    if session_token.is_empty() {
        return Ok(0);
    }

    let token_hash = sessions::hash_session_token(session_token);
    sessions::delete_session_by_token_hash(conn, &token_hash).await
}

/// Revokes every session of the user except the one holding `keep_token`.
pub async fn revoke_other_sessions(conn: &mut DbConn, user_id: Uuid, keep_token: &str) -> Result<u64> {
    let keep_hash = sessions::hash_session_token(keep_token.trim());
    let revoked = sessions::delete_other_sessions(conn, user_id, &keep_hash).await?;

    if revoked > 0 {
        tracing::info!(user_id = %user_id, revoked, "Revoked other sessions");
    }

    Ok(revoked)
}

/// Cleans up all expired sessions from the database
pub async fn cleanup_expired_sessions(conn: &mut DbConn) -> Result<u64> {
    sessions::delete_expired_sessions(conn).await
}
