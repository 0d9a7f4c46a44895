//! Session cookie authentication middleware
//!
//! Resolves the session cookie to a user once per request and hands the
//! identity to handlers through request extensions.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::{User, UserSummary},
    services::{cookies::extract_cookie_value, sessions},
    state::AppState,
};

/// Authenticated user resolved from the session cookie
///
/// Added to request extensions by [`session_auth_middleware`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&AuthenticatedUser> for UserSummary {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Raw session token of the current request, needed to keep this session
/// alive when revoking the others.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Reads the session token from the request's Cookie header.
pub fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| extract_cookie_value(cookies, cookie_name))
        .filter(|token| !token.is_empty())
}

/// Resolves the current user if the request carries a live session.
///
/// Used by public routes that behave differently for signed-in users.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthenticatedUser>> {
    let Some(token) = session_token_from_headers(headers, &state.config.sessions.cookie_name) else {
        return Ok(None);
    };

    let mut conn = state.pool.acquire().await?;
    match sessions::authenticate_session(&mut conn, &token, &state.config.sessions).await {
        Ok((user, _)) => Ok(Some(AuthenticatedUser::from(&user))),
        Err(Error::Authentication(_) | Error::InvalidToken(_) | Error::SessionExpired(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Session authentication middleware
///
/// # Behavior
/// 1. Extracts the session cookie
/// 2. Verifies the token signature
/// 3. Loads the unexpired session and its user
/// 4. Adds `AuthenticatedUser` and `SessionToken` to request extensions
/// 5. Returns 401 "Not authenticated" otherwise
///
/// # Usage
/// ```ignore
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         session_auth_middleware,
///     ))
/// ```
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let not_authenticated = || Error::Authentication("Not authenticated".to_string());

    let token = session_token_from_headers(&headers, &state.config.sessions.cookie_name)
        .ok_or_else(not_authenticated)?;

    let mut conn = state.pool.acquire().await?;
    let (user, _session) = sessions::authenticate_session(&mut conn, &token, &state.config.sessions)
        .await
        .map_err(|e| match e {
            Error::InvalidToken(_) | Error::SessionExpired(_) | Error::Authentication(_) => {
                not_authenticated()
            }
            other => other,
        })?;
    drop(conn);

    request.extensions_mut().insert(AuthenticatedUser::from(&user));
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}
