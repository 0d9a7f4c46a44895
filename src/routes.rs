use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    error::Error,
    handlers::{appointments, auth, clinic, dashboard, health, pets, settings},
    middleware::session_auth_middleware,
    state::AppState,
};

/// Builds the full `/api` router for the portal.
///
/// Public routes cover health, the sign-up and login flow, `check-auth` and
/// `logout`. Everything else sits behind the session middleware.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/register", post(auth::register))
        .route("/register/resend", post(auth::resend_verification))
        .route("/verify", post(auth::verify_email))
        .route("/login", post(auth::login))
        .route("/check-auth", get(auth::check_auth))
        .route("/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/appointments", get(appointments::index))
        .route("/appointments/book", post(appointments::book))
        .route("/appointments/cancel", post(appointments::cancel))
        .route("/appointments/getBookedSlots", get(appointments::booked_slots))
        .route("/pets", get(pets::list_pets))
        .route("/pets/add", post(pets::add_pet))
        .route("/pets/update", post(pets::update_pet))
        .route("/pets/delete", post(pets::delete_pet))
        .route("/pets/qr/{id}", get(pets::pet_qr))
        .route("/pets/download-qr/{id}", get(pets::download_pet_qr))
        .route("/services", get(clinic::list_services))
        .route("/veterinarians", get(clinic::list_veterinarians))
        .route("/settings", get(settings::get_settings))
        .route("/settings/update_profile", post(settings::update_profile))
        .route("/settings/change_password", post(settings::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::map_response(timeout_envelope))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}

/// Gives the bare timeout response the same JSON body as other failures.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return Error::Timeout.into_response();
    }
    response
}
