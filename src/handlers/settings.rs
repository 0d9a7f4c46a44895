use axum::{
    Json,
    extract::{Extension, State},
};
use serde_json::json;

use crate::{
    error::Result,
    handlers::JsonBody,
    middleware::auth::{AuthenticatedUser, SessionToken},
    models::users::{ChangePassword, UpdateProfile},
    services::users,
    state::AppState,
};

/// GET /api/settings
pub async fn get_settings(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let profile = users::get_profile(&mut conn, user.id).await?;

    Ok(Json(json!({ "success": true, "user": profile })))
}

/// POST /api/settings/update_profile
///
/// # HTTP Status Codes
/// - `400 BAD_REQUEST`: Missing name or invalid email
/// - `409 CONFLICT`: Email belongs to another account
pub async fn update_profile(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateProfile>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let profile = users::update_profile(&mut conn, user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

/// POST /api/settings/change_password
///
/// Other sessions of the account are signed out; this one stays valid.
pub async fn change_password(
    Extension(user): Extension<AuthenticatedUser>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ChangePassword>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    users::change_password(&mut conn, user.id, &token, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}
