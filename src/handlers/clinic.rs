use axum::{Json, extract::State};
use serde_json::json;

use crate::{error::Result, services::clinic, state::AppState};

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let services = clinic::list_services(&mut conn).await?;

    Ok(Json(json!({ "success": true, "services": services })))
}

/// GET /api/veterinarians
pub async fn list_veterinarians(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let veterinarians = clinic::list_veterinarians(&mut conn).await?;

    Ok(Json(json!({ "success": true, "veterinarians": veterinarians })))
}
