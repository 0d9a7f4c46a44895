use axum::{
    Json,
    extract::{Extension, State},
};
use serde_json::json;

use crate::{
    error::Result,
    middleware::auth::AuthenticatedUser,
    services::appointments::{self, clinic_now},
    state::AppState,
};

/// GET /api/dashboard
pub async fn dashboard(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let summary = appointments::get_dashboard_summary(&mut conn, user.id, clinic_now().date()).await?;

    Ok(Json(json!({
        "success": true,
        "total_pets": summary.total_pets,
        "upcoming_appointments": summary.upcoming_appointments,
        "completed_visits": summary.completed_visits,
        "appointments": summary.appointments,
    })))
}
