use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    error::Result,
    handlers::JsonBody,
    middleware::auth::{current_user, session_token_from_headers},
    models::users::{LoginUser, RegisterUser, ResendVerification, VerifyEmail},
    services::{
        cookies::{CookieConfig, build_clear_session_cookie, build_session_cookie},
        users,
    },
    state::AppState,
};

/// JSON body plus a `Set-Cookie` header
pub struct CookieResponse {
    json_body: serde_json::Value,
    cookie: String,
}

impl IntoResponse for CookieResponse {
    fn into_response(self) -> Response {
        let (mut parts, body) = Json(self.json_body).into_response().into_parts();

        if let Ok(cookie) = HeaderValue::from_str(&self.cookie) {
            parts.headers.append(SET_COOKIE, cookie);
        }

        Response::from_parts(parts, body)
    }
}

/// POST /api/register
///
/// Creates an unverified account and sends a verification code.
///
/// # HTTP Status Codes
/// - `200 OK`: Registered, code sent
/// - `400 BAD_REQUEST`: Missing or invalid field
/// - `409 CONFLICT`: Email or username already taken
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;

    users::register_user(&mut conn, state.mailer.as_ref(), &state.config.verification, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful! Please check your email to verify your account."
    })))
}

/// POST /api/verify
pub async fn verify_email(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<VerifyEmail>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    users::verify_email(&mut conn, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Email verified successfully! You can now login."
    })))
}

/// POST /api/register/resend
pub async fn resend_verification(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResendVerification>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    users::resend_verification(&mut conn, state.mailer.as_ref(), &state.config.verification, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification code resent to your email!"
    })))
}

/// POST /api/login
///
/// Authenticates with email and password and sets the session cookie
/// (HttpOnly, SameSite=Lax, Secure when configured).
///
/// # HTTP Status Codes
/// - `200 OK`: Authenticated
/// - `400 BAD_REQUEST`: Missing email or password
/// - `401 UNAUTHORIZED`: Invalid email or password
/// - `403 FORBIDDEN`: Email not verified yet
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginUser>,
) -> Result<CookieResponse> {
    let mut conn = state.pool.acquire().await?;
    let login_result = users::login_user(&mut conn, &state.config.sessions, request).await?;

    let cookie = build_session_cookie(
        &login_result.session_token,
        &CookieConfig::from(&state.config.sessions),
    );

    Ok(CookieResponse {
        json_body: json!({
            "success": true,
            "message": "Login successful",
            "user": login_result.user,
        }),
        cookie,
    })
}

/// GET /api/check-auth
pub async fn check_auth(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>> {
    let body = match current_user(&state, &headers).await? {
        Some(user) => json!({ "authenticated": true, "user": user }),
        None => json!({ "authenticated": false }),
    };

    Ok(Json(body))
}

/// POST /api/logout
///
/// Always succeeds; clears the cookie even when no session was found.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<CookieResponse> {
    let token = session_token_from_headers(&headers, &state.config.sessions.cookie_name);

    let mut conn = state.pool.acquire().await?;
    users::logout_user(&mut conn, token.as_deref()).await?;

    Ok(CookieResponse {
        json_body: json!({ "success": true, "message": "Logged out successfully" }),
        cookie: build_clear_session_cookie(&CookieConfig::from(&state.config.sessions)),
    })
}
